use std::fmt;

use crate::provider::ProviderError;

/// Standard pointer appended to most violation messages.
pub const STD_INSTRUCTION: &str = "Please revise settings.yaml.";

// ─── Violations ─────────────────────────────────────────────────────────────

/// Coarse violation class, used as a log field and in summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationClass {
    Syntax,
    Boundary,
    Integrity,
    Reconciliation,
}

impl fmt::Display for ViolationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ViolationClass::Syntax => "syntax",
            ViolationClass::Boundary => "boundary",
            ViolationClass::Integrity => "integrity",
            ViolationClass::Reconciliation => "reconciliation",
        };
        write!(f, "{}", s)
    }
}

/// A single violation detected while validating the work instruction or
/// matching it against the inventory. The first violation aborts the run;
/// there is no partial-success path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// The raw IP string contains a linebreak.
    RuleLinebreak { acg: String, ip: String },
    /// The bare address is not a dotted-quad IPv4 address.
    IpFormat { acg: String, ip: String },
    /// The text after `/` does not parse as an integer.
    PrefixMalformed { acg: String, ip: String, prefix: String },
    /// The prefix parsed but falls outside `prefix_min..=prefix_default`.
    PrefixOutOfRange { acg: String, ip: String, prefix: i64, min: i64, max: i64 },
    /// The bare address appears in the disallowed list of the baseline.
    RuleDisallowed { acg: String, ip: String },
    RuleDescEmpty { acg: String, ip: String },
    RuleDescTooLong { acg: String, ip: String, length: usize, max: usize },
    /// Canonical `address/prefix` strings occurring more than once.
    RuleDuplicate { acg: String, duplicates: Vec<String> },
    RuleCountZero { acg: String },
    RuleCountExceeded { acg: String, count: usize, max: usize },
    AcgQuotaExceeded { count: usize, max: usize },
    AcgNameDuplicate { duplicates: Vec<String> },
    AcgNameEmpty,
    AcgNameTooLong { name: String, length: usize, max: usize },
    AcgDescEmpty { acg: String },
    AcgDescTooLong { acg: String, length: usize, max: usize },
    /// The update route found no IP ACGs in the inventory at all.
    InventoryEmpty,
    /// Two inventory entries share a name, so name lookup is ambiguous.
    InventoryNameCollision { name: String },
    /// Fewer inventory entries were matched by name than the inventory holds.
    InventoryUnmatched { matched: usize, inventory: usize },
    /// The delete route was invoked without any IP ACG id.
    DeleteIdsMissing,
}

impl Violation {
    /// Stable taxonomy key, used in log fields and tests.
    pub fn code(&self) -> &'static str {
        match self {
            Violation::RuleLinebreak { .. } => "rule_linebreak",
            Violation::IpFormat { .. } => "ip_format",
            Violation::PrefixMalformed { .. } => "prefix_malformed",
            Violation::PrefixOutOfRange { .. } => "prefix_out_of_range",
            Violation::RuleDisallowed { .. } => "rule_disallowed",
            Violation::RuleDescEmpty { .. } => "rule_desc_empty",
            Violation::RuleDescTooLong { .. } => "rule_desc_too_long",
            Violation::RuleDuplicate { .. } => "rule_duplicate",
            Violation::RuleCountZero { .. } => "rule_count_zero",
            Violation::RuleCountExceeded { .. } => "rule_count_exceeded",
            Violation::AcgQuotaExceeded { .. } => "acg_quota_exceeded",
            Violation::AcgNameDuplicate { .. } => "acg_name_duplicate",
            Violation::AcgNameEmpty => "acg_name_empty",
            Violation::AcgNameTooLong { .. } => "acg_name_too_long",
            Violation::AcgDescEmpty { .. } => "acg_desc_empty",
            Violation::AcgDescTooLong { .. } => "acg_desc_too_long",
            Violation::InventoryEmpty => "inventory_empty",
            Violation::InventoryNameCollision { .. } => "inventory_name_collision",
            Violation::InventoryUnmatched { .. } => "inventory_unmatched",
            Violation::DeleteIdsMissing => "delete_ids_missing",
        }
    }

    pub fn class(&self) -> ViolationClass {
        match self {
            Violation::RuleLinebreak { .. }
            | Violation::IpFormat { .. }
            | Violation::PrefixMalformed { .. } => ViolationClass::Syntax,
            Violation::PrefixOutOfRange { .. }
            | Violation::RuleDescEmpty { .. }
            | Violation::RuleDescTooLong { .. }
            | Violation::RuleCountZero { .. }
            | Violation::RuleCountExceeded { .. }
            | Violation::AcgQuotaExceeded { .. }
            | Violation::AcgNameEmpty
            | Violation::AcgNameTooLong { .. }
            | Violation::AcgDescEmpty { .. }
            | Violation::AcgDescTooLong { .. } => ViolationClass::Boundary,
            Violation::RuleDisallowed { .. }
            | Violation::RuleDuplicate { .. }
            | Violation::AcgNameDuplicate { .. } => ViolationClass::Integrity,
            Violation::InventoryEmpty
            | Violation::InventoryNameCollision { .. }
            | Violation::InventoryUnmatched { .. }
            | Violation::DeleteIdsMissing => ViolationClass::Reconciliation,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RuleLinebreak { acg, ip } => write!(
                f,
                "Line break found in IP rule [{}] of IP ACG [{}]. {}",
                ip.escape_debug(),
                acg,
                STD_INSTRUCTION
            ),
            Violation::IpFormat { acg, ip } => write!(
                f,
                "IP address [{}] of IP ACG [{}] is invalid. {}",
                ip, acg, STD_INSTRUCTION
            ),
            Violation::PrefixMalformed { acg, ip, prefix } => write!(
                f,
                "Prefix [{}] of IP rule [{}] in IP ACG [{}] is not a number. {}",
                prefix, ip, acg, STD_INSTRUCTION
            ),
            Violation::PrefixOutOfRange { acg, ip, prefix, min, max } => write!(
                f,
                "Prefix [{}] of IP rule [{}] in IP ACG [{}] is invalid; \
                 allowed range is [{}]-[{}]. {}",
                prefix, ip, acg, min, max, STD_INSTRUCTION
            ),
            Violation::RuleDisallowed { acg, ip } => write!(
                f,
                "IP address [{}] of IP ACG [{}] is on the list of disallowed addresses. {}",
                ip, acg, STD_INSTRUCTION
            ),
            Violation::RuleDescEmpty { acg, ip } => write!(
                f,
                "IP rule [{}] of IP ACG [{}] seems to have no description. {}",
                ip, acg, STD_INSTRUCTION
            ),
            Violation::RuleDescTooLong { acg, ip, length, max } => write!(
                f,
                "Description of IP rule [{}] in IP ACG [{}] contains [{}] characters; \
                 more than the [{}] characters AWS allows. {}",
                ip, acg, length, max, STD_INSTRUCTION
            ),
            Violation::RuleDuplicate { acg, duplicates } => write!(
                f,
                "Duplicate rule(s) found in IP ACG [{}]: [{}]. \
                 Note: a rule without a prefix gets the default prefix appended, \
                 which can collide with an explicitly prefixed rule. {}",
                acg,
                duplicates.join(", "),
                STD_INSTRUCTION
            ),
            Violation::RuleCountZero { acg } => write!(
                f,
                "IP ACG [{}] contains no IP rules; at least one rule is required. {}",
                acg, STD_INSTRUCTION
            ),
            Violation::RuleCountExceeded { acg, count, max } => write!(
                f,
                "IP ACG [{}] contains [{}] rules; more than the [{}] IP rules \
                 AWS allows per IP ACG. {}",
                acg, count, max, STD_INSTRUCTION
            ),
            Violation::AcgQuotaExceeded { count, max } => write!(
                f,
                "You specified [{}] IP ACGs; more than the [{}] AWS allows per directory. {}",
                count, max, STD_INSTRUCTION
            ),
            Violation::AcgNameDuplicate { duplicates } => write!(
                f,
                "Duplicate IP ACG name found: [{}]. {}",
                duplicates.join(", "),
                STD_INSTRUCTION
            ),
            Violation::AcgNameEmpty => write!(
                f,
                "One IP ACG in settings.yaml seems to have no name. {}",
                STD_INSTRUCTION
            ),
            Violation::AcgNameTooLong { name, length, max } => write!(
                f,
                "IP ACG name [{}] contains [{}] characters; more than the [{}] \
                 characters AWS allows. {}",
                name, length, max, STD_INSTRUCTION
            ),
            Violation::AcgDescEmpty { acg } => write!(
                f,
                "IP ACG [{}] seems to have no description. {}",
                acg, STD_INSTRUCTION
            ),
            Violation::AcgDescTooLong { acg, length, max } => write!(
                f,
                "Description of IP ACG [{}] contains [{}] characters; more than \
                 the [{}] characters AWS allows. {}",
                acg, length, max, STD_INSTRUCTION
            ),
            Violation::InventoryEmpty => write!(
                f,
                "No IP ACGs found in the inventory. Make sure at least one \
                 IP ACG exists in AWS before updating; run the create route first."
            ),
            Violation::InventoryNameCollision { name } => write!(
                f,
                "The inventory contains more than one IP ACG named [{}]; \
                 names must be unique to match them against settings.yaml.",
                name
            ),
            Violation::InventoryUnmatched { matched, inventory } => write!(
                f,
                "Could not match all current IP ACGs in AWS with the IP ACGs in \
                 settings.yaml: [{}] matched of [{}] in the inventory. Make sure \
                 settings.yaml is in sync with the actual situation in AWS.",
                matched, inventory
            ),
            Violation::DeleteIdsMissing => write!(
                f,
                "You specified the delete route without any IP ACG id. \
                 Please specify at least one IP ACG id to delete."
            ),
        }
    }
}

impl std::error::Error for Violation {}

// ─── Configuration errors ───────────────────────────────────────────────────

/// Error kind for settings.yaml loading failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The file could not be read.
    Io,
    /// The file is not valid YAML.
    Yaml,
    /// The YAML is well-formed but does not have the expected shape.
    Structure,
}

/// Produced while loading and parsing settings.yaml.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
    /// File path, when the error originated from an on-disk load.
    pub path: Option<String>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}]: {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Crate-level error ──────────────────────────────────────────────────────

/// Combined error type for the route entry points.
#[derive(Clone, Debug)]
pub enum Error {
    Config(ConfigError),
    Violation(Violation),
    Provider(ProviderError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Could not load settings.yaml. {}", e),
            Error::Violation(e) => write!(f, "Validation failed. {}", e),
            Error::Provider(e) => write!(f, "Provider call failed. {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Violation(e) => Some(e),
            Error::Provider(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<Violation> for Error {
    fn from(e: Violation) -> Self {
        Error::Violation(e)
    }
}

impl From<ProviderError> for Error {
    fn from(e: ProviderError) -> Self {
        Error::Provider(e)
    }
}
