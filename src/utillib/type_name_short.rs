use std::any::type_name;

/// `type_name` without the module path.
pub fn type_name_short<T>() -> &'static str {
    let name = type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
