use route_planner_shared::BearerToken;
use std::{
    collections::BTreeSet,
    sync::{Mutex, PoisonError},
};

const TOKEN_PREFIX: &str = "dev.";

/// Oldest unspent tokens are forgotten past this many, so abandoned pages cannot grow the ledger.
pub const MAX_OUTSTANDING: usize = 1024;

#[derive(Default)]
struct Ledger {
    next: u64,
    outstanding: BTreeSet<u64>,
}

/// Tokens handed out with the form page and not yet spent. A token gets one attempt, so
/// resubmitting means reloading the form for a fresh one.
#[derive(Default)]
pub struct TokenLedger {
    inner: Mutex<Ledger>,
}

fn serial(token: &BearerToken) -> Option<u64> {
    let hex = token.as_str().strip_prefix(TOKEN_PREFIX)?;
    u64::from_str_radix(hex, 16).ok()
}

impl TokenLedger {
    fn ledger(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A fresh token for one page render.
    pub fn issue(&self) -> BearerToken {
        let mut ledger = self.ledger();
        ledger.next += 1;
        let serial = ledger.next;
        ledger.outstanding.insert(serial);
        if ledger.outstanding.len() > MAX_OUTSTANDING {
            ledger.outstanding.pop_first();
        }

        BearerToken::new(format!("{}{:016x}", TOKEN_PREFIX, serial))
    }

    /// Spends the token. False if it was never issued or is already spent.
    pub fn claim(&self, token: &BearerToken) -> bool {
        match serial(token) {
            Some(serial) => self.ledger().outstanding.remove(&serial),
            None => false,
        }
    }

    /// Hands the attempt back, e.g. when the user only needs to fix their addresses.
    pub fn release(&self, token: &BearerToken) {
        if let Some(serial) = serial(token) {
            self.ledger().outstanding.insert(serial);
        }
    }

    pub fn outstanding(&self) -> usize {
        self.ledger().outstanding.len()
    }
}
