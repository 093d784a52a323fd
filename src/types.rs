use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ─── Rules ──────────────────────────────────────────────────────────────────

/// One IP rule: an IPv4 address, optionally suffixed with `/prefix`, plus a
/// free-text description.
///
/// The `ip` field is mutated in place by validation: spaces are stripped
/// before any check runs. A missing prefix is filled in from
/// [`Limits::prefix_default`] when the rule is canonicalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub ip: String,
    pub desc: String,
}

// ─── IP ACGs ────────────────────────────────────────────────────────────────

/// An IP access control group, either declared in settings.yaml or fetched
/// from the provider inventory.
///
/// `id` is `None` for declared groups that do not exist yet; inventory
/// entries always carry the provider-assigned id. The inventory matcher
/// copies ids onto declared groups with an exactly equal name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAcg {
    pub name: String,
    pub desc: String,
    pub rules: Vec<Rule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Where this group's address set is maintained inside the organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

// ─── Directories ────────────────────────────────────────────────────────────

/// A WorkSpaces directory as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directory {
    pub id: String,
    pub name: String,
    /// Ids of the IP ACGs currently associated with this directory. Absent
    /// when the provider reports no association at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_acg_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A directory reference as declared in settings.yaml.
///
/// Both fields may be absent: an empty reference means "associate with every
/// directory found in the inventory".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ─── Limits ─────────────────────────────────────────────────────────────────

/// Validation baseline loaded from the `user_input_validation` block of
/// settings.yaml. Immutable after parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Rules whose address must never appear in a declared group.
    pub invalid_rules: Vec<Rule>,
    pub rule_count_max: usize,
    /// Shared by rule descriptions and group descriptions.
    pub rule_desc_length_max: usize,
    /// Prefix applied when a rule has no explicit `/prefix` suffix. Also the
    /// largest prefix the bound check accepts: valid prefixes satisfy
    /// `prefix_min <= p <= prefix_default`.
    pub prefix_default: i64,
    pub prefix_min: i64,
    pub acg_name_length_max: usize,
    pub acgs_per_directory_max: usize,
}

// ─── Work instruction and inventory ─────────────────────────────────────────

/// The declared desired state parsed from settings.yaml: which groups should
/// exist, with which rules, associated with which directories, and the tags
/// to stamp on created resources. Groups are sorted by name at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInstruction {
    pub directories: Vec<DirectoryRef>,
    pub ip_acgs: Vec<IpAcg>,
    pub tags: BTreeMap<String, String>,
}

impl WorkInstruction {
    /// True when the first declared directory reference names a concrete
    /// directory. Mutating routes then target the declared directories
    /// instead of every directory in the inventory.
    pub fn directories_specified(&self) -> bool {
        self.directories
            .first()
            .is_some_and(|d| d.id.is_some() && d.name.is_some())
    }
}

/// Snapshot of the provider's current directories and IP ACGs. Read-only
/// after construction; inventory groups always carry an id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub directories: Vec<Directory>,
    pub ip_acgs: Vec<IpAcg>,
}

// ─── Settings ───────────────────────────────────────────────────────────────

/// Everything settings.yaml supplies: the validation baseline and the
/// declared desired state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub limits: Limits,
    pub work_instruction: WorkInstruction,
}
