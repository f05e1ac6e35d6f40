//! Conversion between operation ids and wire-safe tool names
//!
//! Ids may contain `:` which MCP clients reject in tool names, so the
//! separator travels as `___` on the wire.

/// Separator used inside operation ids
pub const ID_SEPARATOR: &str = ":";

/// Token that replaces [`ID_SEPARATOR`] in wire names
pub const WIRE_SEPARATOR: &str = "___";

/// Convert an operation id into its wire name
pub fn to_wire_name(operation_id: &str) -> String {
    operation_id.replace(ID_SEPARATOR, WIRE_SEPARATOR)
}

/// Convert a wire name back into an operation id
pub fn to_operation_id(wire_name: &str) -> String {
    wire_name.replace(WIRE_SEPARATOR, ID_SEPARATOR)
}
