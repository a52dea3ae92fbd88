//! Static template catalog.
//!
//! Plain configuration, built once at startup and looked up by name. Each
//! entry records the template's interface description, the id it is published
//! under in the package registry, and the ordered parameter names its
//! instantiation expects. The kit never validates caller parameters against
//! these names; they are documentation for the host UI.

use std::collections::HashMap;

use chains::ContractAbi;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One deployable organization template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    /// Human-readable template name (catalog key).
    pub name: String,
    /// Opaque interface description of the template contract.
    pub abi: ContractAbi,
    /// Id the template is published under in the package registry.
    pub registry_id: String,
    /// Ordered parameter names for instantiation. The first entry is always
    /// the organization name, which the orchestrator supplies itself.
    pub param_names: Vec<String>,
}

/// Immutable template-name -> descriptor lookup table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: HashMap<String, TemplateDescriptor>,
}

impl Catalog {
    /// Empty catalog; hosts compose their own with [`Catalog::insert`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in templates.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();

        catalog.insert(TemplateDescriptor {
            name: "democracy".to_string(),
            abi: democracy_abi(),
            registry_id: "democracy-template.aragonpm.eth".to_string(),
            param_names: vec![
                "name".to_string(),
                "holders".to_string(), // addresses
                "stakes".to_string(),  // token balances, 18 decimals
                "supportNeeded".to_string(), // percentage, 10^18 base (1% = 10^16)
                "minAcceptanceQuorum".to_string(), // percentage, 10^18 base
                "voteDuration".to_string(), // seconds
            ],
        });

        catalog.insert(TemplateDescriptor {
            name: "multisig".to_string(),
            abi: multisig_abi(),
            registry_id: "multisig-template.aragonpm.eth".to_string(),
            param_names: vec![
                "name".to_string(),
                "signers".to_string(), // addresses
                "neededSignatures".to_string(), // > 0 and <= signers.len()
            ],
        });

        catalog
    }

    /// Add or replace a template descriptor, keyed by its name.
    pub fn insert(&mut self, descriptor: TemplateDescriptor) {
        self.templates.insert(descriptor.name.clone(), descriptor);
    }

    /// Look up a template by name.
    pub fn get(&self, name: &str) -> Option<&TemplateDescriptor> {
        self.templates.get(name)
    }

    /// Sorted list of known template names.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn democracy_abi() -> ContractAbi {
    ContractAbi::from_json(json!([
        {
            "type": "function",
            "name": "newToken",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "symbol", "type": "string" }
            ]
        },
        {
            "type": "function",
            "name": "newInstance",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "holders", "type": "address[]" },
                { "name": "stakes", "type": "uint256[]" },
                { "name": "supportNeeded", "type": "uint64" },
                { "name": "minAcceptanceQuorum", "type": "uint64" },
                { "name": "voteDuration", "type": "uint64" }
            ]
        },
        {
            "type": "event",
            "name": "DeployToken",
            "inputs": [{ "name": "token", "type": "address" }]
        },
        {
            "type": "event",
            "name": "DeployInstance",
            "inputs": [{ "name": "dao", "type": "address" }]
        }
    ]))
}

fn multisig_abi() -> ContractAbi {
    ContractAbi::from_json(json!([
        {
            "type": "function",
            "name": "newToken",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "symbol", "type": "string" }
            ]
        },
        {
            "type": "function",
            "name": "newInstance",
            "inputs": [
                { "name": "name", "type": "string" },
                { "name": "signers", "type": "address[]" },
                { "name": "neededSignatures", "type": "uint256" }
            ]
        },
        {
            "type": "event",
            "name": "DeployToken",
            "inputs": [{ "name": "token", "type": "address" }]
        },
        {
            "type": "event",
            "name": "DeployInstance",
            "inputs": [{ "name": "dao", "type": "address" }]
        }
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_templates() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.names(), vec!["democracy", "multisig"]);

        let democracy = catalog.get("democracy").unwrap();
        assert_eq!(democracy.registry_id, "democracy-template.aragonpm.eth");
        assert_eq!(democracy.param_names.len(), 6);
        assert_eq!(democracy.param_names[0], "name");

        let multisig = catalog.get("multisig").unwrap();
        assert_eq!(multisig.registry_id, "multisig-template.aragonpm.eth");
        assert_eq!(multisig.param_names.len(), 3);
    }

    #[test]
    fn test_unknown_template_is_absent() {
        let catalog = Catalog::builtin();
        assert!(catalog.get("futarchy").is_none());
    }

    #[test]
    fn test_insert_replaces_by_name() {
        let mut catalog = Catalog::builtin();
        let mut descriptor = catalog.get("democracy").unwrap().clone();
        descriptor.registry_id = "democracy-v2.aragonpm.eth".to_string();
        catalog.insert(descriptor);

        assert_eq!(catalog.names().len(), 2);
        assert_eq!(
            catalog.get("democracy").unwrap().registry_id,
            "democracy-v2.aragonpm.eth"
        );
    }
}
