//! Command templates of the component tool, one set per tool generation.
//!
//! The legacy generation addresses compartments with `-s` and terminates
//! every statement with `;`. The modern generation uses `-c` and has no
//! terminator. Which one applies is decided by the JDK home alias of the
//! active build variant, see [`DialectTable`].

use crate::domain::component::ComponentKey;
use crate::utils::error::{Result, ToolError};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JdkHomeAlias {
    Jdk131,
    Jdk142,
    Jdk150,
    Jdk160,
    Jdk170,
    Jdk180,
}

impl JdkHomeAlias {
    pub const ALL: [JdkHomeAlias; 6] = [
        JdkHomeAlias::Jdk131,
        JdkHomeAlias::Jdk142,
        JdkHomeAlias::Jdk150,
        JdkHomeAlias::Jdk160,
        JdkHomeAlias::Jdk170,
        JdkHomeAlias::Jdk180,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JdkHomeAlias::Jdk131 => "JDK1.3.1_HOME",
            JdkHomeAlias::Jdk142 => "JDK1.4.2_HOME",
            JdkHomeAlias::Jdk150 => "JDK1.5.0_HOME",
            JdkHomeAlias::Jdk160 => "JDK1.6.0_HOME",
            JdkHomeAlias::Jdk170 => "JDK1.7.0_HOME",
            JdkHomeAlias::Jdk180 => "JDK1.8.0_HOME",
        }
    }
}

impl fmt::Display for JdkHomeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JdkHomeAlias {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        JdkHomeAlias::ALL
            .iter()
            .find(|alias| alias.as_str() == value.trim())
            .copied()
            .ok_or_else(|| ToolError::DialectResolution {
                alias: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Legacy,
    Modern,
}

/// Parameters of the `loadconfig` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfiguration<'a> {
    pub user: &'a str,
    pub password: &'a str,
    pub workspace: &'a str,
    pub configuration: &'a str,
}

/// Template set of one tool generation.
///
/// Placeholders are written as `{name}` and substituted verbatim; the
/// terminator is appended to every rendered statement.
#[derive(Debug, PartialEq, Eq)]
pub struct Dialect {
    kind: DialectKind,
    terminator: &'static str,
    list_components: &'static str,
    build_component: &'static str,
    sync_component_inactive: &'static str,
    sync_component_archive: &'static str,
    sync_all_archive: &'static str,
    sync_all_inactive: &'static str,
    unsync_component: &'static str,
    load_configuration: &'static str,
    enable_timing: &'static str,
    exit: &'static str,
}

pub static LEGACY: Dialect = Dialect {
    kind: DialectKind::Legacy,
    terminator: ";",
    list_components: "listdcs -s {compartment}",
    build_component: "builddc -s {compartment} -n {name} -v {vendor} -o",
    sync_component_inactive: "syncdc -s {compartment} -n {name} -v {vendor} -m inactive -f",
    sync_component_archive: "syncdc -s {compartment} -n {name} -v {vendor} -m archive",
    sync_all_archive: "syncalldcs -s {compartment} -m archive",
    sync_all_inactive: "syncalldcs -s {compartment} -m inactive",
    unsync_component: "unsyncdc -s {compartment} -n {name} -v {vendor} -f",
    load_configuration: "loadconfig -u {user} -p {password} -r \"{workspace}\" -c {configuration}",
    enable_timing: "timing on",
    exit: "exit",
};

pub static MODERN: Dialect = Dialect {
    kind: DialectKind::Modern,
    terminator: "",
    list_components: "listdcs -c {compartment}",
    build_component: "builddc -c {compartment} -n {name} -v {vendor}",
    sync_component_inactive: "syncdc -c {compartment} -n {name} -v {vendor} -m inactive -f",
    sync_component_archive: "syncdc -c {compartment} -n {name} -v {vendor} -m archive",
    sync_all_archive: "syncalldcs -c {compartment} -m archive",
    sync_all_inactive: "syncalldcs -c {compartment} -m inactive",
    unsync_component: "unsyncdc -c {compartment} -n {name} -v {vendor} -f",
    load_configuration: "loadconfig -u {user} -p {password} -r \"{workspace}\" -d {configuration}",
    enable_timing: "timing on",
    exit: "exit",
};

impl Dialect {
    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    pub fn terminator(&self) -> &'static str {
        self.terminator
    }

    /// Separator used when joining statements into a script.
    pub fn line_separator(&self) -> &'static str {
        "\n"
    }

    pub fn list_components(&self, compartment: &str) -> String {
        self.render(self.list_components, &[("compartment", compartment)])
    }

    pub fn build_component(&self, compartment: &str, component: &ComponentKey) -> String {
        self.render_component(self.build_component, compartment, component)
    }

    pub fn sync_component_inactive(&self, compartment: &str, component: &ComponentKey) -> String {
        self.render_component(self.sync_component_inactive, compartment, component)
    }

    pub fn sync_component_archive(&self, compartment: &str, component: &ComponentKey) -> String {
        self.render_component(self.sync_component_archive, compartment, component)
    }

    pub fn sync_all_archive(&self, compartment: &str) -> String {
        self.render(self.sync_all_archive, &[("compartment", compartment)])
    }

    pub fn sync_all_inactive(&self, compartment: &str) -> String {
        self.render(self.sync_all_inactive, &[("compartment", compartment)])
    }

    pub fn unsync_component(&self, compartment: &str, component: &ComponentKey) -> String {
        self.render_component(self.unsync_component, compartment, component)
    }

    pub fn load_configuration(&self, load: &LoadConfiguration<'_>) -> String {
        self.render(
            self.load_configuration,
            &[
                ("user", load.user),
                ("password", load.password),
                ("workspace", load.workspace),
                ("configuration", load.configuration),
            ],
        )
    }

    pub fn enable_timing(&self) -> String {
        self.render(self.enable_timing, &[])
    }

    pub fn exit(&self) -> String {
        self.render(self.exit, &[])
    }

    fn render_component(&self, template: &str, compartment: &str, component: &ComponentKey) -> String {
        self.render(
            template,
            &[
                ("compartment", compartment),
                ("name", component.name.as_str()),
                ("vendor", component.vendor.as_str()),
            ],
        )
    }

    fn render(&self, template: &str, args: &[(&str, &str)]) -> String {
        let mut statement = template.to_string();
        for (placeholder, value) in args {
            statement = statement.replace(&format!("{{{}}}", placeholder), value);
        }
        statement.push_str(self.terminator);
        statement
    }
}

/// Immutable mapping from JDK home alias to dialect.
#[derive(Debug, Clone)]
pub struct DialectTable {
    entries: HashMap<JdkHomeAlias, &'static Dialect>,
}

impl DialectTable {
    /// Maps every known alias: up to JDK 1.4.2 the legacy tool, from 1.5.0
    /// on the modern one.
    pub fn standard() -> Self {
        let entries = JdkHomeAlias::ALL
            .iter()
            .map(|alias| {
                let dialect = match alias {
                    JdkHomeAlias::Jdk131 | JdkHomeAlias::Jdk142 => &LEGACY,
                    _ => &MODERN,
                };
                (*alias, dialect)
            })
            .collect();

        Self { entries }
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, alias: JdkHomeAlias, dialect: &'static Dialect) -> Self {
        self.entries.insert(alias, dialect);
        self
    }

    pub fn dialect_for(&self, alias: JdkHomeAlias) -> Result<&'static Dialect> {
        self.entries
            .get(&alias)
            .copied()
            .ok_or_else(|| ToolError::DialectResolution {
                alias: alias.to_string(),
            })
    }

    /// Parses the alias text and looks its dialect up.
    pub fn resolve(&self, alias: &str) -> Result<&'static Dialect> {
        self.dialect_for(alias.parse()?)
    }
}

impl Default for DialectTable {
    fn default() -> Self {
        Self::standard()
    }
}
