//! Project records: the authoritative, curator-maintained source files.

use serde::{Deserialize, Deserializer, Serialize};

/// Classification of an on-chain script.
///
/// Written upper-case; read case-insensitively so hand-edited records such as
/// `"type": "Plutus"` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScriptType {
    /// A smart contract written in a versioned Plutus language.
    Plutus,
    /// A native (timelock / multisig) script.
    Native,
}

impl ScriptType {
    /// Return the name used in record and index files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Plutus => "PLUTUS",
            Self::Native => "NATIVE",
        }
    }

    /// Parse a script type from its file name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "PLUTUS" => Some(Self::Plutus),
            "NATIVE" => Some(Self::Native),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for ScriptType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(name.trim()).ok_or_else(|| {
            serde::de::Error::unknown_variant(&name, &["PLUTUS", "NATIVE"])
        })
    }
}

impl std::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A resolved `type` / `plutusVersion` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub script_type: ScriptType,
    pub plutus_version: u32,
}

impl Classification {
    /// Classification of a native timelock script.
    pub fn native() -> Self {
        Self {
            script_type: ScriptType::Native,
            plutus_version: 0,
        }
    }

    /// Classification of a Plutus script of the given language version.
    pub fn plutus(version: u32) -> Self {
        Self {
            script_type: ScriptType::Plutus,
            plutus_version: version,
        }
    }
}

/// External project link block. Only `website` is consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectLink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// One script entry embedded in a project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRecord {
    pub name: String,
    /// Hash as authored: arbitrary case, possibly the 112-char two-credential form.
    pub script_hash: String,
    /// Semantic tag such as SPEND, MINT or MANAGE.
    #[serde(default)]
    pub purpose: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<ScriptType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plutus_version: Option<u32>,
}

impl ScriptRecord {
    /// Whether both classification fields are present.
    pub fn is_classified(&self) -> bool {
        self.script_type.is_some() && self.plutus_version.is_some()
    }

    /// Fill both classification fields.
    pub fn apply(&mut self, classification: Classification) {
        self.script_type = Some(classification.script_type);
        self.plutus_version = Some(classification.plutus_version);
    }
}

/// One project file. Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Display name; a record without a usable label is skipped.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    #[serde(default)]
    pub link: Option<ProjectLink>,
    #[serde(default)]
    pub scripts: Vec<ScriptRecord>,
}

impl ProjectRecord {
    /// The website link, if any.
    pub fn website(&self) -> Option<&str> {
        self.link.as_ref().and_then(|l| l.website.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_record_and_ignores_unknown_fields() {
        let raw = r#"{
            "label": "Minswap",
            "category": "DEFI",
            "subCategory": "AMM_DEX",
            "link": {"website": "https://minswap.org", "twitter": "x"},
            "audits": [],
            "scripts": [
                {"name": "Pool", "scriptHash": "AB12", "purpose": "SPEND", "type": "PLUTUS", "plutusVersion": 2},
                {"name": "Order", "scriptHash": "cd34", "purpose": "SPEND"}
            ]
        }"#;
        let record: ProjectRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.label.as_deref(), Some("Minswap"));
        assert_eq!(record.website(), Some("https://minswap.org"));
        assert_eq!(record.scripts.len(), 2);
        assert!(record.scripts[0].is_classified());
        assert_eq!(record.scripts[0].script_type, Some(ScriptType::Plutus));
        assert!(!record.scripts[1].is_classified());
    }

    #[test]
    fn script_type_names() {
        assert_eq!(ScriptType::from_name("native"), Some(ScriptType::Native));
        assert_eq!(ScriptType::from_name("Plutus"), Some(ScriptType::Plutus));
        assert_eq!(ScriptType::from_name("timelock"), None);
        assert_eq!(ScriptType::Plutus.to_string(), "PLUTUS");
    }

    #[test]
    fn script_type_is_read_case_insensitively() {
        let script: ScriptRecord = serde_json::from_str(
            r#"{"name": "Pool", "scriptHash": "ab", "type": "Plutus", "plutusVersion": 3}"#,
        )
        .unwrap();
        assert_eq!(script.script_type, Some(ScriptType::Plutus));
        assert!(script.is_classified());
        assert_eq!(serde_json::to_value(&script).unwrap()["type"], "PLUTUS");

        let bad = serde_json::from_str::<ScriptRecord>(
            r#"{"name": "Pool", "scriptHash": "ab", "type": "wasm"}"#,
        );
        assert!(bad.is_err());
    }
}
