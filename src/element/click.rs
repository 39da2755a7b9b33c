//! Single-click detection that stays out of the way of double clicks.
//!
//! A raw click only counts once no second click or double click follows
//! within the click delay.

use crate::core::geo::LatLng;
use crate::runtime::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ClickState {
    #[default]
    Idle,
    Pending { timer: TimerId, lat_lng: LatLng },
}

/// What the element has to do after feeding a raw click
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickTransition {
    /// Start a delay timer for this position
    Schedule(LatLng),
    /// Cancel the running timer, the click sequence was a multi-click
    Cancel(TimerId),
}

impl ClickState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ClickState::Pending { .. })
    }

    pub fn timer(&self) -> Option<TimerId> {
        match self {
            ClickState::Pending { timer, .. } => Some(*timer),
            ClickState::Idle => None,
        }
    }

    /// Raw click. Idle arms a timer; pending gives up on the pending one.
    pub fn click(&mut self, lat_lng: LatLng) -> ClickTransition {
        match std::mem::take(self) {
            ClickState::Idle => ClickTransition::Schedule(lat_lng),
            ClickState::Pending { timer, .. } => ClickTransition::Cancel(timer),
        }
    }

    /// Records the timer started for a scheduled click
    pub fn arm(&mut self, timer: TimerId, lat_lng: LatLng) {
        *self = ClickState::Pending { timer, lat_lng };
    }

    /// Drops any pending click, returning the timer to cancel
    pub fn cancel(&mut self) -> Option<TimerId> {
        std::mem::take(self).timer()
    }

    /// Timer expiry. Returns the click position if `timer` is the one pending.
    pub fn fire(&mut self, timer: TimerId) -> Option<LatLng> {
        match *self {
            ClickState::Pending {
                timer: pending,
                lat_lng,
            } if pending == timer => {
                *self = ClickState::Idle;
                Some(lat_lng)
            }
            _ => None,
        }
    }
}
