use std::fmt;

use cura_types::{AccountId, Numeric};
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, ReplayResult};

/// Operation name carried by an [`Action`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Deposit,
    Withdraw,
    BuyShares,
    Claim,
    Sleep,
    Step,
    MintShares,
    DistributeRoyalties,
    ClaimRoyalties,
    TransferShares,
    Transfer,
    Mint,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdraw => "WITHDRAW",
            Self::BuyShares => "BUY_SHARES",
            Self::Claim => "CLAIM",
            Self::Sleep => "SLEEP",
            Self::Step => "STEP",
            Self::MintShares => "MINT_SHARES",
            Self::DistributeRoyalties => "DISTRIBUTE_ROYALTIES",
            Self::ClaimRoyalties => "CLAIM_ROYALTIES",
            Self::TransferShares => "TRANSFER_SHARES",
            Self::Transfer => "TRANSFER",
            Self::Mint => "MINT",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Component of the replay state an action is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    Chain,
    ReserveToken,
    CurationPool,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::ReserveToken => "reserveToken",
            Self::CurationPool => "curationPool",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Positional argument: an account name or a number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionArg {
    Number(Numeric),
    Text(String),
}

impl From<Numeric> for ActionArg {
    fn from(value: Numeric) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ActionArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl fmt::Display for ActionArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

/// One step of a replay, as written in a scenario.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub target: Target,
    #[serde(default)]
    pub args: Vec<ActionArg>,
}

impl Action {
    pub fn new(kind: ActionKind, target: Target, args: Vec<ActionArg>) -> Self {
        Self { kind, target, args }
    }

    pub fn deposit(account: &str, amount: Numeric) -> Self {
        Self::new(
            ActionKind::Deposit,
            Target::CurationPool,
            vec![account.into(), amount.into()],
        )
    }

    pub fn withdraw(account: &str, amount: Numeric) -> Self {
        Self::new(
            ActionKind::Withdraw,
            Target::CurationPool,
            vec![account.into(), amount.into()],
        )
    }

    pub fn buy_shares(account: &str, shares: Numeric) -> Self {
        Self::new(
            ActionKind::BuyShares,
            Target::CurationPool,
            vec![account.into(), shares.into()],
        )
    }

    pub fn claim(account: &str) -> Self {
        Self::new(ActionKind::Claim, Target::CurationPool, vec![account.into()])
    }

    pub fn sleep(blocks: u64) -> Self {
        Self::new(ActionKind::Sleep, Target::Chain, vec![(blocks as Numeric).into()])
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.kind, self.target)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// An [`Action`] resolved against its target, with typed arguments.
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    Sleep(u64),
    Step,
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Numeric,
    },
    Mint {
        to: AccountId,
        amount: Numeric,
    },
    Deposit {
        account: AccountId,
        amount: Numeric,
    },
    Withdraw {
        account: AccountId,
        amount: Numeric,
    },
    BuyShares {
        account: AccountId,
        shares: Numeric,
    },
    Claim {
        account: AccountId,
    },
    MintShares,
    DistributeRoyalties {
        royalties: Numeric,
    },
    ClaimRoyalties {
        account: AccountId,
    },
    TransferShares {
        from: AccountId,
        to: AccountId,
        amount: Numeric,
    },
}

impl Operation {
    /// Resolve the target and kind of `action` and check its arguments.
    pub fn resolve(action: &Action) -> ReplayResult<Self> {
        use ActionKind as K;

        let op = match (action.target, action.kind) {
            (Target::Chain, K::Sleep) => Self::Sleep(Args::exactly(action, 1)?.blocks(0)?),
            (Target::Chain, K::Step) => {
                Args::exactly(action, 0)?;
                Self::Step
            }

            (Target::ReserveToken, K::Transfer) => {
                let args = Args::exactly(action, 3)?;
                Self::Transfer {
                    from: args.account(0)?,
                    to: args.account(1)?,
                    amount: args.number(2)?,
                }
            }
            (Target::ReserveToken, K::Mint) => {
                let args = Args::exactly(action, 2)?;
                Self::Mint {
                    to: args.account(0)?,
                    amount: args.number(1)?,
                }
            }

            (Target::CurationPool, K::Deposit) => {
                let args = Args::exactly(action, 2)?;
                Self::Deposit {
                    account: args.account(0)?,
                    amount: args.number(1)?,
                }
            }
            (Target::CurationPool, K::Withdraw) => {
                let args = Args::exactly(action, 2)?;
                Self::Withdraw {
                    account: args.account(0)?,
                    amount: args.number(1)?,
                }
            }
            (Target::CurationPool, K::BuyShares) => {
                let args = Args::exactly(action, 2)?;
                Self::BuyShares {
                    account: args.account(0)?,
                    shares: args.number(1)?,
                }
            }
            (Target::CurationPool, K::Claim) => Self::Claim {
                account: Args::exactly(action, 1)?.account(0)?,
            },
            (Target::CurationPool, K::MintShares) => {
                Args::exactly(action, 0)?;
                Self::MintShares
            }
            (Target::CurationPool, K::DistributeRoyalties) => Self::DistributeRoyalties {
                royalties: Args::exactly(action, 1)?.number(0)?,
            },
            (Target::CurationPool, K::ClaimRoyalties) => Self::ClaimRoyalties {
                account: Args::exactly(action, 1)?.account(0)?,
            },
            (Target::CurationPool, K::TransferShares) => {
                let args = Args::exactly(action, 3)?;
                Self::TransferShares {
                    from: args.account(0)?,
                    to: args.account(1)?,
                    amount: args.number(2)?,
                }
            }

            (target, kind) => return Err(ReplayError::UnsupportedAction { kind, target }),
        };
        Ok(op)
    }
}

/// Positional argument reader for one action.
struct Args<'a> {
    kind: ActionKind,
    args: &'a [ActionArg],
}

impl<'a> Args<'a> {
    fn exactly(action: &'a Action, count: usize) -> ReplayResult<Self> {
        let args = Self {
            kind: action.kind,
            args: &action.args,
        };
        if action.args.len() != count {
            return Err(args.invalid(format!(
                "expected {count} arguments, got {}",
                action.args.len()
            )));
        }
        Ok(args)
    }

    fn invalid(&self, reason: String) -> ReplayError {
        ReplayError::InvalidArguments {
            kind: self.kind,
            reason,
        }
    }

    fn account(&self, index: usize) -> ReplayResult<AccountId> {
        match &self.args[index] {
            ActionArg::Text(name) if !name.is_empty() => Ok(AccountId::new(name.clone())),
            other => Err(self.invalid(format!(
                "argument {index} must be an account name, got {other:?}"
            ))),
        }
    }

    fn number(&self, index: usize) -> ReplayResult<Numeric> {
        match &self.args[index] {
            ActionArg::Number(value) => Ok(*value),
            other => Err(self.invalid(format!("argument {index} must be a number, got {other:?}"))),
        }
    }

    fn blocks(&self, index: usize) -> ReplayResult<u64> {
        let value = self.number(index)?;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Ok(value as u64)
        } else {
            Err(self.invalid(format!(
                "argument {index} must be a whole number of blocks, got {value}"
            )))
        }
    }
}
