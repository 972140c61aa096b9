// Central place for user-visible strings and other non-localized constants.
// Keep these out of session.rs to reduce duplication and make tweaks safer.

// English notification strings (EN_ prefix to make future localization easier)
pub const EN_ERR_NAME_EMPTY: &str = "Name is empty";
pub const EN_ERR_VALUE_EMPTY: &str = "Value is empty";

pub const EN_NODE_RENAMED: &str = "Node renamed";
pub const EN_PROPERTY_CREATED: &str = "Property created";
pub const EN_PROPERTY_REMOVED: &str = "Property removed";

// Repository paths.
pub const ROOT_PATH: &str = "/";
pub const PATH_SEPARATOR: char = '/';

// The tree mirror roots every content path under this marker ("/a/b" lives at "/root/a/b").
pub const TREE_ROOT_PREFIX: &str = "/root";
pub const TREE_ROOT_NAME: &str = "root";

// Tree mirror attribute keys.
pub const TREE_ATTR_NAME: &str = "name";
pub const TREE_ATTR_PATH: &str = "path";

// Property type names, indexed by type code.
pub const TYPE_UNDEFINED: &str = "undefined";
pub const TYPE_STRING: &str = "String";
pub const TYPE_BINARY: &str = "Binary";
pub const TYPE_LONG: &str = "Long";
pub const TYPE_DOUBLE: &str = "Double";
pub const TYPE_DATE: &str = "Date";
pub const TYPE_BOOLEAN: &str = "Boolean";
pub const TYPE_NAME: &str = "Name";
pub const TYPE_PATH: &str = "Path";
pub const TYPE_REFERENCE: &str = "Reference";
pub const TYPE_WEAK_REFERENCE: &str = "WeakReference";
pub const TYPE_URI: &str = "URI";
pub const TYPE_DECIMAL: &str = "Decimal";

pub const EN_LITERAL_NAN: &str = "NaN";
pub const EN_LITERAL_INFINITY: &str = "Infinity";
pub const EN_LITERAL_NEG_INFINITY: &str = "-Infinity";
