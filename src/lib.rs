//! Validation and reconciliation engine for directory IP access control
//! groups (IP ACGs).
//!
//! The desired end state lives in `settings.yaml`: the IP ACGs with their
//! CIDR rules, the directories to associate them with, resource tags, and
//! the validation baseline. This crate provides the pipeline between that
//! file and the provider calls:
//!
//! ```text
//! parse_settings(yaml) → Settings → validate_work_instruction(wi, limits)
//!                                 → match_ip_acgs(inventory, wi) → routes
//! ```
//!
//! Every route (status, create, update, delete) runs the same prologue:
//! fetch the inventory from the provider, report it, then load and validate
//! the settings. Only then does a route issue mutating calls, through the
//! [`provider::AcgProvider`] trait.
//!
//! # Quick Start
//!
//! ```rust
//! let yaml = r#"
//! ip_acgs:
//!   - name: office
//!     desc: Office breakout range
//!     origin: network team
//!     rules:
//!       - "10.0.0.1 ": Office gateway
//! directories:
//!   - id: d-1111aaaa22
//!     name: corp.example.com
//! tags:
//!   Environment: test
//! user_input_validation:
//!   ip_address:
//!     invalid:
//!       - "0.0.0.0": Everything
//!     prefix:
//!       default: 32
//!       min: 27
//!   ip_acg:
//!     rules_amt:
//!       max: 10
//!     rules_desc_length:
//!       max: 64
//!     name_length:
//!       max: 50
//!     groups_per_directory_amt:
//!       max: 25
//! "#;
//!
//! let mut settings = acgctl::parse_settings(yaml).expect("well-formed settings");
//! acgctl::validate_work_instruction(&mut settings.work_instruction, &settings.limits)
//!     .expect("valid work instruction");
//!
//! // Rule addresses are normalized in place (spaces stripped).
//! assert_eq!(settings.work_instruction.ip_acgs[0].rules[0].ip, "10.0.0.1");
//! assert_eq!(settings.limits.prefix_default, 32);
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `aws`   | no      | AWS WorkSpaces backend. Enables [`provider::aws::AwsProvider`] and the `acgctl` binary. |

pub mod actions;
pub mod config;
pub mod error;
pub mod provider;
pub mod reconcile;
pub mod report;
pub mod types;
pub mod validate;

pub use error::*;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use config::{load_settings, parse_settings};
pub use reconcile::match_ip_acgs;
pub use validate::validate_work_instruction;

/// Convenience entry point composing load → validate.
///
/// Reads the settings file at `path` and validates the declared work
/// instruction against the baseline limits from the same file.
///
/// # Errors
///
/// Returns [`Error::Config`] when the file cannot be read or parsed, and
/// [`Error::Violation`] when the declared configuration breaks a validation
/// rule.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
///
/// let settings = acgctl::load(Path::new("settings.yaml")).expect("valid settings");
/// println!("{} IP ACGs declared", settings.work_instruction.ip_acgs.len());
/// ```
pub fn load(path: &std::path::Path) -> Result<Settings, Error> {
    let mut settings = config::load_settings(path)?;
    validate::validate_work_instruction(&mut settings.work_instruction, &settings.limits)?;

    Ok(settings)
}
