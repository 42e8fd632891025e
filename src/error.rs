/// Log-and-discard handling for errors that are recovered locally instead of
/// propagated. Discovery failures, stream errors, and sink write failures all
/// fall under this policy.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error and discards it, yielding `None`.
    fn ok_log(self) -> Option<T>;

    /// Like [`ok_log`](Self::ok_log), with a context prefix on the logged line.
    fn ok_log_msg(self, msg: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }

    fn ok_log_msg(self, msg: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{msg}: {err}");
                None
            }
        }
    }
}
