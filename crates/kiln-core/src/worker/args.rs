//! Which launch arguments the worker gets to see.

/// Host flags that take a value, either as the next argument or `--flag=value`.
const HOST_FLAGS_WITH_VALUE: &[&str] = &["--user-data-dir", "--open-url", "--config", "--log-level"];

/// Host flags without a value.
const HOST_SWITCHES: &[&str] = &["--no-fork", "--no-early-window"];

/// Strip host-only flags (and their values) from the launch arguments.
/// Everything else, including the positional resource path, is forwarded
/// in its original order.
pub fn filter_forwarded_args(args: &[String]) -> Vec<String> {
    let mut forwarded = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if HOST_SWITCHES.contains(&arg.as_str()) {
            continue;
        }
        if HOST_FLAGS_WITH_VALUE.contains(&arg.as_str()) {
            iter.next();
            continue;
        }
        let is_inline_value = HOST_FLAGS_WITH_VALUE
            .iter()
            .any(|flag| arg.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')));
        if is_inline_value {
            continue;
        }
        forwarded.push(arg.clone());
    }

    forwarded
}
