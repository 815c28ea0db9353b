/*!
 * Power Bracket
 *
 * Reference-counted "keep the device busy" bracket around every operation
 * that touches hardware registers. The N-th `busy` is balanced by the N-th
 * `idle` no matter how unrelated brackets interleave.
 */

mod module;

pub use module::ModulePower;

/// Device power/clock gating collaborator
pub trait PowerBracket: Send + Sync {
    /// Take a reference; the device stays powered while any are held
    fn busy(&self);

    /// Drop a reference taken by `busy`
    fn idle(&self);
}
