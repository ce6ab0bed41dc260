//! Diff computation between synthesized documents
//!
//! Compares two Terraform JSON documents block by block so a fresh
//! synthesis can be previewed against the one already on disk. This is a
//! structural comparison of declarations, not a plan against live
//! infrastructure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// How a block differs between two documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Change {
    /// Present only in the new document
    Added,
    /// Present only in the old document
    Removed,
    /// Present in both with different attributes
    Modified { attributes: Vec<String> },
}

/// A single differing block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDiff {
    /// Address of the block (e.g. "aws_instance.minecraftServer", "output.publicIp")
    pub address: String,
    /// Top-level block the address lives in
    pub block: String,
    pub change: Change,
}

impl DocumentDiff {
    pub fn is_addition(&self) -> bool {
        matches!(self.change, Change::Added)
    }

    pub fn is_removal(&self) -> bool {
        matches!(self.change, Change::Removed)
    }

    pub fn is_modification(&self) -> bool {
        matches!(self.change, Change::Modified { .. })
    }
}

/// Compare two synthesized documents
///
/// Metadata is ignored. Results are sorted by address.
pub fn diff_documents(old: &Value, new: &Value) -> Vec<DocumentDiff> {
    let old_blocks = flatten(old);
    let new_blocks = flatten(new);

    let addresses: BTreeSet<&String> = old_blocks.keys().chain(new_blocks.keys()).collect();
    addresses
        .into_iter()
        .filter_map(|address| {
            let change = match (old_blocks.get(address), new_blocks.get(address)) {
                (None, Some(_)) => Change::Added,
                (Some(_), None) => Change::Removed,
                (Some((_, before)), Some((_, after))) if before != after => Change::Modified {
                    attributes: changed_attributes(before, after),
                },
                _ => return None,
            };
            let block = old_blocks
                .get(address)
                .or_else(|| new_blocks.get(address))
                .map(|(block, _)| block.clone())
                .unwrap_or_default();
            Some(DocumentDiff {
                address: address.clone(),
                block,
                change,
            })
        })
        .collect()
}

/// Diff summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub additions: usize,
    pub removals: usize,
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[DocumentDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.change {
                Change::Added => summary.additions += 1,
                Change::Removed => summary.removals += 1,
                Change::Modified { .. } => summary.modifications += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by top-level block
pub fn group_by_block(diffs: &[DocumentDiff]) -> BTreeMap<String, Vec<&DocumentDiff>> {
    let mut groups: BTreeMap<String, Vec<&DocumentDiff>> = BTreeMap::new();
    for diff in diffs {
        groups.entry(diff.block.clone()).or_default().push(diff);
    }
    groups
}

/// Address -> (block, body)
fn flatten(doc: &Value) -> BTreeMap<String, (String, Value)> {
    let mut out = BTreeMap::new();
    let Some(root) = doc.as_object() else {
        return out;
    };

    for (block, content) in root {
        match block.as_str() {
            "//" => {}
            "terraform" => {
                out.insert("terraform".to_string(), (block.clone(), content.clone()));
            }
            "provider" => {
                for (name, configs) in entries(content) {
                    let configs = configs.as_array().cloned().unwrap_or_default();
                    for (i, config) in configs.into_iter().enumerate() {
                        out.insert(format!("provider.{name}[{i}]"), (block.clone(), config));
                    }
                }
            }
            "data" | "resource" => {
                let prefix = if block == "data" { "data." } else { "" };
                for (type_name, by_name) in entries(content) {
                    for (name, body) in entries(by_name) {
                        out.insert(
                            format!("{prefix}{type_name}.{name}"),
                            (block.clone(), body.clone()),
                        );
                    }
                }
            }
            _ => {
                for (name, body) in entries(content) {
                    out.insert(format!("{block}.{name}"), (block.clone(), body.clone()));
                }
            }
        }
    }
    out
}

fn entries(value: &Value) -> impl Iterator<Item = (&String, &Value)> {
    value.as_object().into_iter().flat_map(Map::iter)
}

fn changed_attributes(before: &Value, after: &Value) -> Vec<String> {
    match (before.as_object(), after.as_object()) {
        (Some(before), Some(after)) => before
            .keys()
            .chain(after.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|key| before.get(*key) != after.get(*key))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(instance_type: &str, with_output: bool) -> Value {
        let mut d = json!({
            "//": { "metadata": { "stackName": "demo" } },
            "provider": { "aws": [ { "region": "eu-west-1" } ] },
            "resource": { "aws_instance": { "server": {
                "ami": "${data.aws_ami.ami.id}",
                "instance_type": instance_type,
            }}},
        });
        if with_output {
            d["output"] = json!({ "publicIp": { "value": "${aws_instance.server.public_ip}" } });
        }
        d
    }

    #[test]
    fn test_identical_documents_have_no_diff() {
        assert!(diff_documents(&doc("t2.small", true), &doc("t2.small", true)).is_empty());
    }

    #[test]
    fn test_detects_modified_attribute() {
        let diffs = diff_documents(&doc("t2.small", false), &doc("t3.medium", false));
        assert_eq!(
            diffs,
            vec![DocumentDiff {
                address: "aws_instance.server".into(),
                block: "resource".into(),
                change: Change::Modified {
                    attributes: vec!["instance_type".into()]
                },
            }]
        );
        assert!(diffs[0].is_modification());
        assert_eq!(DiffSummary::from_diffs(&diffs).modifications, 1);
    }

    #[test]
    fn test_additions_and_removals() {
        let added = diff_documents(&doc("t2.small", false), &doc("t2.small", true));
        assert_eq!(added.len(), 1);
        assert!(added[0].is_addition());
        assert_eq!(added[0].address, "output.publicIp");

        let removed = diff_documents(&doc("t2.small", true), &doc("t2.small", false));
        assert!(removed[0].is_removal());

        let summary = DiffSummary::from_diffs(&removed);
        assert_eq!(summary.removals, 1);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_metadata_ignored() {
        let mut other = doc("t2.small", true);
        other["//"] = json!({ "metadata": { "stackName": "renamed" } });
        assert!(diff_documents(&doc("t2.small", true), &other).is_empty());
    }

    #[test]
    fn test_group_by_block() {
        let diffs = diff_documents(&json!({}), &doc("t2.small", true));
        let groups = group_by_block(&diffs);
        let blocks: Vec<&String> = groups.keys().collect();
        assert_eq!(blocks, vec!["output", "provider", "resource"]);
    }
}
