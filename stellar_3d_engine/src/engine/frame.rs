/// Frame loop
///
/// The host drives the engine by calling `render_frame` with a timestamp
/// once per display refresh. Each pumped frame resolves pending loads,
/// fires begin hooks, runs the render-loop callbacks, fires end hooks and
/// performs the light cache wipe. A backgrounded engine skips frames
/// entirely unless configured otherwise. Device loss pauses the pump: lost
/// frames are skipped, and the rebuild fires once when the device reports
/// restored.

use std::mem;

use crate::engine::{Engine, FrameHookFn, RenderLoopFn};
use crate::engine_warn;

const SOURCE: &str = "stellar3d::FrameLoop";

impl Engine {
    // ===== LOOP CONTROL =====

    /// Register a render-loop callback and start looping
    pub fn run_render_loop(&mut self, callback: RenderLoopFn) {
        self.render_loop_callbacks.push(callback);
        self.looping = true;
    }

    /// Stop looping and drop every registered callback
    pub fn stop_render_loop(&mut self) {
        self.looping = false;
        self.render_loop_callbacks.clear();
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Mark the host window as backgrounded/foregrounded
    ///
    /// While backgrounded, `render_frame` is a no-op unless the engine was
    /// built with `render_even_in_background`.
    pub fn set_background(&mut self, background: bool) {
        self.background = background;
    }

    // ===== FRAME HOOKS =====

    /// Register a hook fired at the start of every pumped frame
    pub fn on_begin_frame(&mut self, hook: FrameHookFn) {
        self.begin_frame_hooks.push(hook);
    }

    /// Register a hook fired at the end of every pumped frame
    pub fn on_end_frame(&mut self, hook: FrameHookFn) {
        self.end_frame_hooks.push(hook);
    }

    // ===== FRAME PUMP =====

    /// Pump one frame; `now_ms` is the host's monotonic clock
    pub fn render_frame(&mut self, now_ms: f64) {
        if !self.looping {
            return;
        }
        if self.background && !self.options.render_even_in_background {
            return;
        }

        if !self.options.do_not_handle_context_lost {
            if self.device.is_context_lost() {
                if !self.context_lost_observed {
                    self.context_lost_observed = true;
                    engine_warn!(SOURCE, "Device context lost; rendering paused until restore");
                }
                return;
            }
            if self.context_lost_observed {
                self.context_lost_observed = false;
                engine_warn!(SOURCE, "Device context restored, rebuilding resources");
                self.rebuild_context();
            }
        }

        self.pump_pending_loads();
        self.begin_frame(now_ms);

        let mut callbacks = mem::take(&mut self.render_loop_callbacks);
        for callback in callbacks.iter_mut() {
            callback(self);
        }
        // A callback may have stopped the loop or registered new callbacks
        if self.looping {
            callbacks.extend(self.render_loop_callbacks.drain(..));
            self.render_loop_callbacks = callbacks;
        }

        self.end_frame();
    }

    /// Start-of-frame bookkeeping: frame id, draw-call stats, timing sample
    pub fn begin_frame(&mut self, now_ms: f64) {
        self.frame_id += 1;
        self.draw_calls_last_frame = self.draw_calls_this_frame;
        self.draw_calls_this_frame = 0;
        self.performance.sample_frame(now_ms);

        let mut hooks = mem::take(&mut self.begin_frame_hooks);
        for hook in hooks.iter_mut() {
            hook(self);
        }
        hooks.extend(self.begin_frame_hooks.drain(..));
        self.begin_frame_hooks = hooks;
    }

    /// End-of-frame bookkeeping: end hooks, then the light cache wipe
    pub fn end_frame(&mut self) {
        let mut hooks = mem::take(&mut self.end_frame_hooks);
        for hook in hooks.iter_mut() {
            hook(self);
        }
        hooks.extend(self.end_frame_hooks.drain(..));
        self.end_frame_hooks = hooks;

        self.wipe_caches(false);
    }

    // ===== STATS =====

    /// Frames pumped since construction
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Smoothed frames-per-second, `None` until two frames were sampled
    pub fn fps(&self) -> Option<f64> {
        self.performance.average_fps()
    }

    /// Last frame-to-frame interval in milliseconds
    pub fn delta_time_ms(&self) -> Option<f64> {
        self.performance.instantaneous_frame_time_ms()
    }

    /// Draw calls submitted during the previous completed frame
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls_last_frame
    }
}
