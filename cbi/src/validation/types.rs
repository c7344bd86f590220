use std::collections::HashMap;
use std::fmt;

use super::validator::Context;

/// Signature of a validator function: inspects `cx.value`, records its
/// expectation through [`Context::assert`] and returns the verdict.
pub type TypeFn = fn(&mut Context<'_>, &[Arg]) -> bool;

macro_rules! builtins {
    ($($variant:ident => $name:literal,)*) => {
        /// The built-in validators.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Builtin {
            $($variant,)*
        }

        impl Builtin {
            pub const ALL: &'static [Builtin] = &[$(Builtin::$variant,)*];

            /// Name used in validator expressions.
            pub fn name(self) -> &'static str {
                match self {
                    $(Builtin::$variant => $name,)*
                }
            }
        }
    };
}

builtins! {
    Integer => "integer",
    UInteger => "uinteger",
    Float => "float",
    UFloat => "ufloat",
    IpAddr => "ipaddr",
    Ip4Addr => "ip4addr",
    Ip6Addr => "ip6addr",
    Ip6Ll => "ip6ll",
    Ip6Ula => "ip6ula",
    Ip4Prefix => "ip4prefix",
    Ip6Prefix => "ip6prefix",
    Cidr => "cidr",
    Cidr4 => "cidr4",
    Cidr6 => "cidr6",
    IpNet4 => "ipnet4",
    IpNet6 => "ipnet6",
    Ip6HostId => "ip6hostid",
    IpMask => "ipmask",
    IpMask4 => "ipmask4",
    IpMask6 => "ipmask6",
    IpRange => "iprange",
    IpRange4 => "iprange4",
    IpRange6 => "iprange6",
    Port => "port",
    PortRange => "portrange",
    MacAddr => "macaddr",
    Host => "host",
    Hostname => "hostname",
    Network => "network",
    HostPort => "hostport",
    Ip4AddrPort => "ip4addrport",
    IpAddrPort => "ipaddrport",
    WpaKey => "wpakey",
    WepKey => "wepkey",
    UciName => "uciname",
    UciFw4ZoneName => "ucifw4zonename",
    NetDevName => "netdevname",
    Range => "range",
    Min => "min",
    Max => "max",
    Length => "length",
    RangeLength => "rangelength",
    MinLength => "minlength",
    MaxLength => "maxlength",
    Or => "or",
    And => "and",
    Neg => "neg",
    List => "list",
    Tuple => "tuple",
    Sep => "sep",
    PhoneDigit => "phonedigit",
    TimeHhMmSs => "timehhmmss",
    DateYyyyMmDd => "dateyyyymmdd",
    Unique => "unique",
    HexString => "hexstring",
    String => "string",
    Directory => "directory",
    File => "file",
    Device => "device",
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A host-registered validator.
#[derive(Clone, Copy)]
pub struct CustomType {
    pub name: &'static str,
    pub func: TypeFn,
}

impl fmt::Debug for CustomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomType").field("name", &self.name).finish()
    }
}

impl PartialEq for CustomType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && std::ptr::fn_addr_eq(self.func, other.func)
    }
}

/// A resolved validator reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Callee {
    Builtin(Builtin),
    Custom(CustomType),
}

impl Callee {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Builtin(builtin) => builtin.name(),
            Self::Custom(custom) => custom.name,
        }
    }
}

impl From<Builtin> for Callee {
    fn from(builtin: Builtin) -> Self {
        Self::Builtin(builtin)
    }
}

/// One compiled argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Number(f64),
    Str(String),
    Call(ValidatorSpec),
}

impl Arg {
    /// Numeric view of a literal. Calls are NaN.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            Self::Str(s) => crate::coerce::to_number(s),
            Self::Call(_) => f64::NAN,
        }
    }

    /// Textual view of a literal, as it would appear in a message.
    pub fn as_text(&self) -> String {
        match self {
            Self::Number(n) => crate::coerce::number_to_string(*n),
            Self::Str(s) => s.clone(),
            Self::Call(spec) => spec.root.name().to_string(),
        }
    }

    /// Truthiness of a flag argument (`hostname("strict")`, `cidr(1)`).
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
            Self::Call(_) => true,
        }
    }

    /// Loose equality of a literal with a field value. A call never equals.
    pub fn loosely_equals(&self, value: &str) -> bool {
        match self {
            Self::Str(s) => s == value,
            Self::Number(n) => *n == crate::coerce::to_number(value),
            Self::Call(_) => false,
        }
    }
}

/// A compiled validator expression: the callee and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatorSpec {
    pub root: Callee,
    pub args: Vec<Arg>,
}

impl ValidatorSpec {
    pub fn new(root: impl Into<Callee>) -> Self {
        Self {
            root: root.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }
}

/// Name to validator lookup used by the compiler.
///
/// Starts with every [`Builtin`]; hosts may register additional validators
/// or shadow a built-in name.
#[derive(Debug, Clone)]
pub struct TypeTable {
    entries: HashMap<&'static str, Callee>,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self {
            entries: Builtin::ALL
                .iter()
                .map(|&builtin| (builtin.name(), Callee::Builtin(builtin)))
                .collect(),
        }
    }
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom validator under `name`.
    pub fn register(&mut self, name: &'static str, func: TypeFn) -> &mut Self {
        self.entries
            .insert(name, Callee::Custom(CustomType { name, func }));
        self
    }

    pub fn with(mut self, name: &'static str, func: TypeFn) -> Self {
        self.register(name, func);
        self
    }

    pub fn get(&self, name: &str) -> Option<Callee> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
