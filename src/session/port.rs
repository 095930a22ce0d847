use std::sync::atomic::{AtomicU16, Ordering};

static DRIVER_PORT_COUNTER: AtomicU16 = AtomicU16::new(9515);

/// Allocate the next driver-server port.
/// Starts at 9515 and increments; wraps around at 65500. On wrap the counter
/// is set past the returned port so the wrapped value is not reissued.
pub fn allocate_driver_port() -> u16 {
    let port = DRIVER_PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
    if port > 65500 {
        DRIVER_PORT_COUNTER.store(9516, Ordering::SeqCst);
        return 9515;
    }
    port
}
