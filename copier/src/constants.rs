// ============================================================================
// RECURSION CONSTANTS
// ============================================================================

/// Maximum nesting depth for recursive record/mapping copies when no override is given
pub const DEFAULT_MAX_DEPTH: usize = 32;

// ============================================================================
// TAG CONSTANTS
// ============================================================================

/// Tag text marking a member as ignored
pub const TAG_IGNORE: &str = "-";

/// Tag text marking a destination member as required
pub const TAG_MUST: &str = "must";

/// Prefix of a rename directive, followed by a quoted name (`rename:"NewName"`)
pub const TAG_RENAME_PREFIX: &str = "rename:";

/// Separator between tag items
pub const TAG_SEPARATOR: char = ',';

// ============================================================================
// PATH CONSTANTS
// ============================================================================

/// Display form of the root member path
pub const ROOT_PATH: &str = "<root>";
