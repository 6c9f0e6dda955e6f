use std::fmt;

use crate::context::{SupplyContext, TransferContext};

/// Observer invoked around a transfer.
pub type TransferHook = Box<dyn FnMut(&TransferContext) + Send>;

/// Observer invoked around a mint or burn.
pub type SupplyHook = Box<dyn FnMut(&SupplyContext) + Send>;

/// Lifecycle stage a hook is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookStage {
    PreTransfer,
    PostTransfer,
    PreMint,
    PostMint,
    PreBurn,
    PostBurn,
}

// ---------------------------------------------------------------------------
// LedgerHooks
// ---------------------------------------------------------------------------

/// Ordered observer lists, one per [`HookStage`].
///
/// Hooks run in registration order with the current context. They observe
/// only: a hook cannot veto or alter the mutation it surrounds.
#[derive(Default)]
pub struct LedgerHooks {
    pre_transfer: Vec<TransferHook>,
    post_transfer: Vec<TransferHook>,
    pre_mint: Vec<SupplyHook>,
    post_mint: Vec<SupplyHook>,
    pre_burn: Vec<SupplyHook>,
    post_burn: Vec<SupplyHook>,
}

impl LedgerHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre_transfer(mut self, hook: impl FnMut(&TransferContext) + Send + 'static) -> Self {
        self.pre_transfer.push(Box::new(hook));
        self
    }

    pub fn post_transfer(mut self, hook: impl FnMut(&TransferContext) + Send + 'static) -> Self {
        self.post_transfer.push(Box::new(hook));
        self
    }

    pub fn pre_mint(mut self, hook: impl FnMut(&SupplyContext) + Send + 'static) -> Self {
        self.pre_mint.push(Box::new(hook));
        self
    }

    pub fn post_mint(mut self, hook: impl FnMut(&SupplyContext) + Send + 'static) -> Self {
        self.post_mint.push(Box::new(hook));
        self
    }

    pub fn pre_burn(mut self, hook: impl FnMut(&SupplyContext) + Send + 'static) -> Self {
        self.pre_burn.push(Box::new(hook));
        self
    }

    pub fn post_burn(mut self, hook: impl FnMut(&SupplyContext) + Send + 'static) -> Self {
        self.post_burn.push(Box::new(hook));
        self
    }

    /// Append every list of `other` after the hooks already registered.
    pub fn append(&mut self, other: LedgerHooks) {
        self.pre_transfer.extend(other.pre_transfer);
        self.post_transfer.extend(other.post_transfer);
        self.pre_mint.extend(other.pre_mint);
        self.post_mint.extend(other.post_mint);
        self.pre_burn.extend(other.pre_burn);
        self.post_burn.extend(other.post_burn);
    }

    /// Number of hooks registered for a stage.
    pub fn count(&self, stage: HookStage) -> usize {
        match stage {
            HookStage::PreTransfer => self.pre_transfer.len(),
            HookStage::PostTransfer => self.post_transfer.len(),
            HookStage::PreMint => self.pre_mint.len(),
            HookStage::PostMint => self.post_mint.len(),
            HookStage::PreBurn => self.pre_burn.len(),
            HookStage::PostBurn => self.post_burn.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pre_transfer.is_empty()
            && self.post_transfer.is_empty()
            && self.pre_mint.is_empty()
            && self.post_mint.is_empty()
            && self.pre_burn.is_empty()
            && self.post_burn.is_empty()
    }

    pub(crate) fn run_transfer(&mut self, stage: HookStage, context: &TransferContext) {
        let hooks = match stage {
            HookStage::PreTransfer => &mut self.pre_transfer,
            HookStage::PostTransfer => &mut self.post_transfer,
            _ => return,
        };
        for hook in hooks.iter_mut() {
            hook(context);
        }
    }

    pub(crate) fn run_supply(&mut self, stage: HookStage, context: &SupplyContext) {
        let hooks = match stage {
            HookStage::PreMint => &mut self.pre_mint,
            HookStage::PostMint => &mut self.post_mint,
            HookStage::PreBurn => &mut self.pre_burn,
            HookStage::PostBurn => &mut self.post_burn,
            _ => return,
        };
        for hook in hooks.iter_mut() {
            hook(context);
        }
    }
}

impl fmt::Debug for LedgerHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerHooks")
            .field("pre_transfer", &self.pre_transfer.len())
            .field("post_transfer", &self.post_transfer.len())
            .field("pre_mint", &self.pre_mint.len())
            .field("post_mint", &self.post_mint.len())
            .field("pre_burn", &self.pre_burn.len())
            .field("post_burn", &self.post_burn.len())
            .finish()
    }
}
