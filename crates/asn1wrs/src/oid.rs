//! Object-identifier name-to-number resolution (§6.2).
//!
//! `OBJECT IDENTIFIER` values name arcs either numerically (`2`) or by a
//! standard identifier (`asn1`). The standard identifiers for the ITU-T,
//! ISO, and joint-ISO-ITU-T root arcs are fixed by assignment, not derived
//! from anything else in the module under compilation, so the lookup table
//! is carried verbatim rather than computed.

use crate::ast::OidComponent;

/// `"<parent-number>/<name>" -> arc number`, plus the three root arcs keyed
/// `"/<name>"`. Matches the ITU-T X.660 arc assignments used by the
/// original compiler's `oid_names` table.
const OID_NAMES: &[(&str, u32)] = &[
    ("/itu-t", 0),
    ("0/recommendation", 0),
    ("0.0/h", 8),
    ("0.0/q", 17),
    ("0.0/x", 24),
    ("0/question", 1),
    ("0/administration", 2),
    ("0/network-operator", 3),
    ("0/identified-organization", 4),
    ("0/r-recommendation", 5),
    ("0/data", 9),
    ("/iso", 1),
    ("1/standard", 0),
    ("1/registration-authority", 1),
    ("1/member-body", 2),
    ("1/identified-organization", 3),
    ("/joint-iso-itu-t", 2),
    ("2/presentation", 0),
    ("2/asn1", 1),
    ("2/association-control", 2),
    ("2/reliable-transfer", 3),
    ("2/remote-operations", 4),
    ("2/ds", 5),
    ("2/mhs", 6),
    ("2/ccr", 7),
    ("2/oda", 8),
    ("2/ms", 9),
];

fn lookup(path: &str, name: &str) -> Option<u32> {
    let key = format!("{path}/{name}");
    OID_NAMES.iter().find(|(k, _)| *k == key).map(|(_, n)| *n)
}

/// Resolves a value's ordered OID components to their numeric arcs.
///
/// Each named component is looked up against the path of numbers resolved
/// so far (`"<parent-number>/<name>"`), mirroring the original compiler's
/// incremental `path` accumulator. A named component with an explicit
/// `name(number)` pairing uses the given number directly without a lookup.
/// A name that resolves against neither the table nor an explicit pairing
/// falls back to `0` (the original falls back to the name string itself,
/// which this compiler's Non-goals exclude from downstream use).
#[must_use]
pub fn resolve(components: &[OidComponent]) -> Vec<u32> {
    let mut path = String::new();
    let mut out = Vec::with_capacity(components.len());
    for component in components {
        let number = match component {
            OidComponent::Number(n) => *n,
            OidComponent::Named { number: Some(n), .. } => *n,
            OidComponent::Named { name, number: None } => lookup(&path, name).unwrap_or(0),
        };
        out.push(number);
        path = format!("{path}/{number}");
        path = path.trim_start_matches('/').to_string();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_root_arc_names() {
        let components = vec![
            OidComponent::Named { name: "iso".to_string(), number: None },
            OidComponent::Named {
                name: "identified-organization".to_string(),
                number: None,
            },
        ];
        assert_eq!(resolve(&components), vec![1, 3]);
    }

    #[test]
    fn explicit_pairing_wins_over_lookup() {
        let components = vec![OidComponent::Named {
            name: "iso".to_string(),
            number: Some(42),
        }];
        assert_eq!(resolve(&components), vec![42]);
    }

    #[test]
    fn bare_numbers_pass_through() {
        let components = vec![OidComponent::Number(1), OidComponent::Number(2), OidComponent::Number(840)];
        assert_eq!(resolve(&components), vec![1, 2, 840]);
    }

    #[test]
    fn unresolvable_name_falls_back_to_zero() {
        let components = vec![OidComponent::Named {
            name: "not-a-real-arc".to_string(),
            number: None,
        }];
        assert_eq!(resolve(&components), vec![0]);
    }
}
