/// Renders an error and its causes outermost-cause-last, one per line:
/// the root cause first as "Got an error: ..." and each context after it as
/// "While ...".
pub fn describe_chain(err: &anyhow::Error) -> String {
    err.chain()
        .rev()
        .enumerate()
        .map(|(i, e)| match i {
            0 => format!("Got an error: {e}"),
            _ => format!("While {e}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Awaits a command body and flattens its error chain into a single message
/// suitable for showing to the invoking user.
#[macro_export]
macro_rules! command_handler_wrapper {
    ($command:expr) => {
        $command.await.map_err(|err| {
            tracing::error!("Command failed: {err:?}");
            anyhow::anyhow!("{}", $crate::error_handle::describe_chain(&err))
        })
    };
}
