//! Host callbacks for semantic actions.
//!
//! The engine never runs actions itself. A host that does not want to
//! handle [`Pcr::Suspended`] by hand implements [`Host`] and lets
//! [`PdaRun::drive`] loop over suspensions, dispatching each one to the
//! matching callback.

use rewind_tables::FrameId;

use crate::error::PdaError;
use crate::reverse::ReverseUnit;
use crate::run::{Entry, Pcr, PdaRun, Suspend};
use crate::source::TokenSource;

/// What an action may touch while the parse is suspended.
pub struct ActionContext<'a> {
    pub pda: &'a mut PdaRun,
    pub input: &'a mut dyn TokenSource,
}

/// Semantic-action callbacks. Every method defaults to doing nothing
/// useful beyond keeping the parse moving.
pub trait Host {
    /// A production with an action was reduced. Call
    /// [`PdaRun::reject`] to make the reduction fail.
    fn reduction(&mut self, cx: &mut ActionContext<'_>, frame: FrameId) {
        let _ = (cx, frame);
    }

    /// A token with a generation action matched. The matched text is still
    /// in the input; the default consumes and drops it.
    fn generation(&mut self, cx: &mut ActionContext<'_>, frame: FrameId) {
        let _ = frame;
        if let Some(matched) = cx.pda.generation_match() {
            cx.input.pull_text(matched.len);
        }
    }

    /// End-of-file is about to be delivered.
    fn pre_eof(&mut self, cx: &mut ActionContext<'_>, frame: FrameId) {
        let _ = (cx, frame);
    }

    /// Undo the effects described by `unit`, newest group first.
    fn reverse(&mut self, cx: &mut ActionContext<'_>, unit: &ReverseUnit) {
        let _ = (cx, unit);
    }
}

/// Which operation [`PdaRun::drive`] runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Drive {
    Run,
    Finish,
    UndoTo(u64),
}

impl PdaRun {
    /// Run `op` to completion, answering every suspension through `host`.
    pub fn drive<H: Host + ?Sized>(
        &mut self,
        input: &mut dyn TokenSource,
        host: &mut H,
        op: Drive,
    ) -> Result<(), PdaError> {
        let mut entry = Entry::Start;
        loop {
            let pcr = match op {
                Drive::Run => self.run(input, entry)?,
                Drive::Finish => self.finish(input, entry)?,
                Drive::UndoTo(steps) => self.undo_to_step(input, steps, entry)?,
            };
            let Pcr::Suspended(point) = pcr else {
                return Ok(());
            };

            let frame = self.frame();
            let unit = if point == Suspend::Reverse {
                self.take_reverse_unit()
            } else {
                None
            };
            let mut cx = ActionContext {
                pda: self,
                input: &mut *input,
            };
            match (point, frame) {
                (Suspend::Reduction, Some(frame)) => host.reduction(&mut cx, frame),
                (Suspend::Generation, Some(frame)) => host.generation(&mut cx, frame),
                (Suspend::PreEof, Some(frame)) => host.pre_eof(&mut cx, frame),
                (Suspend::Reverse, _) => {
                    if let Some(unit) = &unit {
                        host.reverse(&mut cx, unit);
                    }
                }
                (_, None) => {}
            }
            entry = Entry::Resume(point);
        }
    }
}
