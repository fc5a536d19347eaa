use core::{convert::Infallible, fmt, ops, str::FromStr};

/// Syslog priority used for every emitted record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Priority {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    #[default]
    Info,
    Debug,
}

impl Priority {
    /// The `LOG_*` level value from `<syslog.h>`.
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Emerg => 0,
            Self::Alert => 1,
            Self::Crit => 2,
            Self::Err => 3,
            Self::Warning => 4,
            Self::Notice => 5,
            Self::Info => 6,
            Self::Debug => 7,
        }
    }
}

/// Syslog facility. Only `USER` and `LOCAL0` through `LOCAL7` are accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facility {
    User,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    #[default]
    Local6,
    Local7,
}

impl Facility {
    /// The `LOG_*` facility value from `<syslog.h>` (already shifted).
    pub const fn as_raw(self) -> i32 {
        let code = match self {
            Self::User => 1,
            Self::Local0 => 16,
            Self::Local1 => 17,
            Self::Local2 => 18,
            Self::Local3 => 19,
            Self::Local4 => 20,
            Self::Local5 => 21,
            Self::Local6 => 22,
            Self::Local7 => 23,
        };
        code << 3
    }
}

/// Bit set of `openlog(3)` options.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OpenOptions(i32);

impl OpenOptions {
    /// Log the process id with each message.
    pub const PID: Self = Self(0x01);
    /// Write to the console if sending to the system logger fails.
    pub const CONS: Self = Self(0x02);
    /// Connect to the system logger immediately.
    pub const NDELAY: Self = Self(0x08);
    /// Also write each message to stderr.
    pub const PERROR: Self = Self(0x20);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl ops::BitOr for OpenOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for OpenOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for OpenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(OpenOptions, &str); 4] = [
            (OpenOptions::CONS, "CONS"),
            (OpenOptions::NDELAY, "NDELAY"),
            (OpenOptions::PERROR, "PERROR"),
            (OpenOptions::PID, "PID"),
        ];
        let mut set = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                set.entry(&format_args!("{name}"));
            }
        }
        set.finish()
    }
}

/// One recognized token after the ident.
enum Token {
    Priority(Priority),
    OpenOption(OpenOptions),
    Facility(Facility),
}

impl Token {
    /// Names are the `<syslog.h>` constants without the `LOG_` prefix,
    /// matched case-sensitively.
    fn from_name(name: &str) -> Option<Self> {
        let token = match name {
            "EMERG" => Self::Priority(Priority::Emerg),
            "ALERT" => Self::Priority(Priority::Alert),
            "CRIT" => Self::Priority(Priority::Crit),
            "ERR" => Self::Priority(Priority::Err),
            "WARNING" => Self::Priority(Priority::Warning),
            "NOTICE" => Self::Priority(Priority::Notice),
            "INFO" => Self::Priority(Priority::Info),
            "DEBUG" => Self::Priority(Priority::Debug),

            "CONS" => Self::OpenOption(OpenOptions::CONS),
            "NDELAY" => Self::OpenOption(OpenOptions::NDELAY),
            "PERROR" => Self::OpenOption(OpenOptions::PERROR),
            "PID" => Self::OpenOption(OpenOptions::PID),

            "USER" => Self::Facility(Facility::User),
            "LOCAL0" => Self::Facility(Facility::Local0),
            "LOCAL1" => Self::Facility(Facility::Local1),
            "LOCAL2" => Self::Facility(Facility::Local2),
            "LOCAL3" => Self::Facility(Facility::Local3),
            "LOCAL4" => Self::Facility(Facility::Local4),
            "LOCAL5" => Self::Facility(Facility::Local5),
            "LOCAL6" => Self::Facility(Facility::Local6),
            "LOCAL7" => Self::Facility(Facility::Local7),
            _ => return None,
        };
        Some(token)
    }
}

/// Parsed logger parameter.
///
/// The parameter has the form `ident[,OPTION,...]`. The ident is the syslog
/// program identity; a naming scheme such as
/// `PROJECT.APP.VERSION.ENV.IDENTIFIER` works well. Each following token is
/// one of:
///
/// - a priority (`EMERG` .. `DEBUG`), last one wins,
/// - an open option (`CONS`, `NDELAY`, `PERROR`, `PID`), all are combined,
/// - a facility (`USER`, `LOCAL0` .. `LOCAL7`), last one wins.
///
/// Unrecognized tokens are ignored. Without any open option the options
/// default to `NDELAY | PID`; the facility defaults to `LOCAL6` and the
/// priority to `INFO`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggerConfig {
    pub ident: String,
    pub priority: Priority,
    pub options: OpenOptions,
    pub facility: Facility,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            ident: Self::DEFAULT_IDENT.to_owned(),
            priority: Priority::default(),
            options: Self::DEFAULT_OPTIONS,
            facility: Facility::default(),
        }
    }
}

impl LoggerConfig {
    /// Ident used when no parameter is configured.
    pub const DEFAULT_IDENT: &'static str = "tinyflake";

    /// Options used when the parameter names none.
    pub const DEFAULT_OPTIONS: OpenOptions =
        OpenOptions(OpenOptions::NDELAY.0 | OpenOptions::PID.0);

    /// Parses an optional logger parameter. `None` yields the defaults.
    pub fn parse(param: Option<&str>) -> Self {
        let Some(param) = param else {
            return Self::default();
        };

        let mut parts = param.split(',');
        let ident = parts.next().unwrap_or_default().to_owned();
        let mut priority = Priority::default();
        let mut options = OpenOptions::empty();
        let mut facility = Facility::default();

        for token in parts.filter_map(Token::from_name) {
            match token {
                Token::Priority(p) => priority = p,
                Token::OpenOption(o) => options |= o,
                Token::Facility(f) => facility = f,
            }
        }

        if options.is_empty() {
            options = Self::DEFAULT_OPTIONS;
        }

        Self {
            ident,
            priority,
            options,
            facility,
        }
    }
}

impl FromStr for LoggerConfig {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(Some(s)))
    }
}
