/*!
# Stellar 3D Engine - Null Device Backend

Headless implementation of the `stellar_3d_engine` device trait.

This crate provides a backend that executes every device command against
in-memory storage instead of a GPU: texture uploads are retained so
`read_pixels` round-trips, framebuffer attachments are tracked so render
targets resolve, and every command bumps a counter on a shared stats handle.
It serves automated tests, server-side scene processing and CI pipelines
where no graphics driver is available.
*/

mod null_device;

pub use null_device::{NullDevice, NullDeviceHandle, NullDeviceStats};
