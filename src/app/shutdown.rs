use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[cfg(unix)]
use signal_hook::{SigId, consts::TERM_SIGNALS, flag, low_level::unregister};

// Termination signals raise the flag instead of killing the process, so the
// collector can drain in-flight connections.
pub struct StopSignal {
    stop: Arc<AtomicBool>,
    #[cfg(unix)]
    registered: Vec<SigId>,
}

impl StopSignal {
    pub fn install() -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));

        #[cfg(unix)]
        {
            let registered = TERM_SIGNALS
                .iter()
                .map(|signal| flag::register(*signal, Arc::clone(&stop)))
                .collect::<io::Result<Vec<SigId>>>()?;
            Ok(Self { stop, registered })
        }

        #[cfg(not(unix))]
        {
            Ok(Self { stop })
        }
    }

    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }
}

#[cfg(unix)]
impl Drop for StopSignal {
    fn drop(&mut self) {
        for id in self.registered.drain(..) {
            unregister(id);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::sync::atomic::Ordering;

    use signal_hook::consts::signal::SIGTERM;
    use signal_hook::low_level::raise;

    use super::StopSignal;

    #[test]
    fn sigterm_raises_the_stop_flag() {
        let signal = StopSignal::install().expect("signal handlers should install");
        let stop = signal.flag();
        assert!(!stop.load(Ordering::SeqCst));

        raise(SIGTERM).expect("signal should be raised");

        assert!(stop.load(Ordering::SeqCst));
    }
}
