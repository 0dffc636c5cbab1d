use thiserror::Error;

/// Errors raised by the position ledger when an index does not address an item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Index {index} is out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// A structural edit addressed a child that its parent does not contain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    #[error("'{child_id}' is not part of '{parent_id}'")]
    MissingChild { parent_id: String, child_id: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// A referenced catalog entity does not resolve, or is still referenced elsewhere.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Template '{0}' not found in the catalog")]
    TemplateNotFound(String),

    #[error("Group '{0}' not found in the catalog")]
    GroupNotFound(String),

    #[error("Section '{0}' not found in the catalog")]
    SectionNotFound(String),

    #[error("Blueprint '{0}' not found in the catalog")]
    BlueprintNotFound(String),

    #[error("Section '{section_id}' is still referenced by blueprint '{blueprint_id}'")]
    SectionInUse {
        section_id: String,
        blueprint_id: String,
    },

    #[error("Group '{group_id}' is still referenced by '{referrer_id}'")]
    GroupInUse {
        group_id: String,
        referrer_id: String,
    },

    #[error("Template '{template_id}' is still referenced by '{referrer_id}'")]
    TemplateInUse {
        template_id: String,
        referrer_id: String,
    },

    #[error("Setup '{0}' not found in the workspace")]
    SetupNotFound(String),

    #[error("Flow '{0}' not found in the workspace")]
    FlowNotFound(String),
}

/// Errors that abort instantiation before any setup or flow is created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstantiateError {
    #[error("Blueprint failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// A flow-scoped singleton or shared-configuration rule would be broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Constraint violation: {}", .0.join("; "))]
pub struct ConstraintViolation(pub Vec<String>);

/// Errors produced by editing-session commands. Live state is untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Node '{0}' not found in the live graph")]
    NodeNotFound(String),

    #[error("Edge '{0}' not found in the live graph")]
    EdgeNotFound(String),

    #[error("Block '{0}' not found in the live graph")]
    BlockNotFound(String),

    #[error("An element with id '{0}' already exists in the live graph")]
    DuplicateId(String),

    #[error("Edit would leave the graph invalid: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("The flow has no configuration node")]
    MissingConfigurationNode,

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Constraint(#[from] ConstraintViolation),
}

/// Errors raised while reading or writing persisted documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to parse document JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Document failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("Could not access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// The role gate refused a mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Role '{role}' may not mutate {scope}")]
pub struct AccessError {
    pub role: String,
    pub scope: String,
}

/// Errors raised while loading engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration JSON: {0}")]
    JsonParseError(#[from] serde_json::Error),

    #[error("Could not read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
