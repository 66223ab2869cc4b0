pub const MAX_PER_KEY: usize = 15;

/// Prepend a value, removing any existing duplicate and capping the list.
pub fn push_value(values: &mut Vec<String>, value: &str) {
    values.retain(|v| v != value);
    values.insert(0, value.to_string());
    values.truncate(MAX_PER_KEY);
}
