//! Workspace definition parsing.

use std::collections::BTreeMap;

use embark_core::component::{
    AppConfig, ComponentConfig, ComponentKind, HwDesignRef, PlatformConfig, SourceFile,
    SourceFileSet,
};
use embark_core::ComponentName;
use kdl::{KdlDocument, KdlNode};

use crate::{ConfigError, ConfigResult};

/// One declared component.
#[derive(Debug, Clone)]
pub struct ComponentDef {
    pub name: ComponentName,
    pub config: ComponentConfig,
}

/// A parsed workspace definition file.
#[derive(Debug, Clone)]
pub struct WorkspaceDef {
    pub name: String,
    pub components: Vec<ComponentDef>,
}

/// Parse a workspace definition from KDL text.
pub fn parse_workspace(kdl: &str) -> ConfigResult<WorkspaceDef> {
    let doc: KdlDocument = kdl.parse()?;

    let mut name = String::new();
    let mut components: Vec<ComponentDef> = Vec::new();

    for node in doc.nodes() {
        match node.name().value() {
            "workspace" => {
                name = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("workspace name".to_string()))?;
            }
            "platform" => {
                components.push(parse_platform(node)?);
            }
            "application" => {
                components.push(parse_application(node)?);
            }
            _ => {} // Ignore unknown nodes
        }
    }

    if name.is_empty() {
        return Err(ConfigError::MissingField("workspace name".to_string()));
    }

    // Duplicate names across both kinds are definition errors.
    let mut seen = Vec::new();
    for component in &components {
        if seen.contains(&&component.name) {
            return Err(ConfigError::Duplicate(component.name.to_string()));
        }
        seen.push(&component.name);
    }

    // Every application must reference a platform declared in this file.
    let platforms: Vec<&ComponentName> = components
        .iter()
        .filter(|c| c.config.kind() == ComponentKind::Platform)
        .map(|c| &c.name)
        .collect();
    for component in &components {
        if let Some(app) = component.config.as_application() {
            if !platforms.contains(&&app.platform) {
                return Err(ConfigError::InvalidReference(format!(
                    "application '{}' references unknown platform '{}'",
                    component.name, app.platform
                )));
            }
        }
    }

    Ok(WorkspaceDef { name, components })
}

fn parse_platform(node: &KdlNode) -> ConfigResult<ComponentDef> {
    let name = component_name(node, "platform")?;

    let hw_design = child_string(node, "hw-design")
        .ok_or_else(|| ConfigError::MissingField(format!("platform '{name}' hw-design")))?;
    let cpu = child_string(node, "cpu")
        .ok_or_else(|| ConfigError::MissingField(format!("platform '{name}' cpu")))?;
    let os = child_string(node, "os").unwrap_or_else(|| "standalone".to_string());
    let domain = child_string(node, "domain").unwrap_or_else(|| format!("{os}_{cpu}"));
    let compiler = child_string(node, "compiler").unwrap_or_else(|| "gcc".to_string());
    let generate_dtb = child_bool(node, "generate-dtb").unwrap_or(false);

    let mut advanced = BTreeMap::new();
    if let Some(children) = node.children() {
        for child in children.nodes().iter().filter(|n| n.name().value() == "option") {
            let args = get_all_string_args(child);
            let [key, value] = args.as_slice() else {
                return Err(ConfigError::InvalidValue {
                    field: format!("platform '{name}' option"),
                    message: "expected: option \"key\" \"value\"".to_string(),
                });
            };
            advanced.insert(key.clone(), value.clone());
        }
    }

    Ok(ComponentDef {
        name,
        config: ComponentConfig::Platform(PlatformConfig {
            hw_design: HwDesignRef::new(hw_design),
            os,
            cpu,
            domain,
            compiler,
            generate_dtb,
            advanced,
        }),
    })
}

fn parse_application(node: &KdlNode) -> ConfigResult<ComponentDef> {
    let name = component_name(node, "application")?;

    let platform = child_string(node, "platform")
        .ok_or_else(|| ConfigError::MissingField(format!("application '{name}' platform")))?;
    let platform = ComponentName::new(platform).map_err(|e| ConfigError::InvalidValue {
        field: format!("application '{name}' platform"),
        message: e.to_string(),
    })?;
    let domain = child_string(node, "domain")
        .ok_or_else(|| ConfigError::MissingField(format!("application '{name}' domain")))?;

    let mut sources = SourceFileSet::new();
    if let Some(children) = node.children() {
        for child in children.nodes().iter().filter(|n| n.name().value() == "source") {
            let path = get_first_string_arg(child).ok_or_else(|| {
                ConfigError::MissingField(format!("application '{name}' source path"))
            })?;
            let file = SourceFile::from_source(path).map_err(|e| ConfigError::InvalidValue {
                field: format!("application '{name}' source"),
                message: e.to_string(),
            })?;
            sources.insert(file, false).map_err(|e| ConfigError::Duplicate(e.to_string()))?;
        }
    }

    Ok(ComponentDef {
        name,
        config: ComponentConfig::Application(AppConfig {
            platform,
            domain,
            sources,
        }),
    })
}

fn component_name(node: &KdlNode, kind: &str) -> ConfigResult<ComponentName> {
    let raw = get_first_string_arg(node)
        .ok_or_else(|| ConfigError::MissingField(format!("{kind} name")))?;
    ComponentName::new(raw).map_err(|e| ConfigError::InvalidValue {
        field: format!("{kind} name"),
        message: e.to_string(),
    })
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_all_string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string())
        .map(|s| s.to_string())
        .collect()
}

fn child_string(node: &KdlNode, name: &str) -> Option<String> {
    node.children()?
        .nodes()
        .iter()
        .find(|n| n.name().value() == name)
        .and_then(get_first_string_arg)
}

fn child_bool(node: &KdlNode, name: &str) -> Option<bool> {
    node.children()?
        .nodes()
        .iter()
        .find(|n| n.name().value() == name)
        .and_then(|n| {
            n.entries()
                .iter()
                .find(|e| e.name().is_none())
                .and_then(|e| e.value().as_bool())
        })
}
