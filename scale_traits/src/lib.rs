pub mod reading;

pub use reading::Reading;

/// A weighing instrument that yields one reading per successful call.
///
/// Implementations block for at most `timeout`. Errors cross this boundary
/// boxed; the sampler classifies them (idle, transient, fatal) by downcast.
pub trait Scale {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>>;
}

impl<S: Scale + ?Sized> Scale for Box<S> {
    fn read(
        &mut self,
        timeout: std::time::Duration,
    ) -> Result<Reading, Box<dyn std::error::Error + Send + Sync>> {
        (**self).read(timeout)
    }
}
