//! Session derivation (spec §4.3), grounded in `exchanges.go`'s
//! `getCurrentSession`/`GetChangeSessionTime`.

use crate::config::{ExchangeConfig, Session};
use chrono::{Datelike, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// The four base trading sessions (spec §3). Pre-market countdown markers
/// (`pre-30m`, `pre-5m`, `pre-1m`) are a scheduler-level concern layered on
/// top of this, not a fifth state `current_session` returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Pre,
    Regular,
    Post,
    Closed,
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionKind::Pre => "pre",
            SessionKind::Regular => "regular",
            SessionKind::Post => "post",
            SessionKind::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// The wire-level session status (spec §3/§6): the four base sessions plus
/// the scheduler's pre-market countdown markers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pre,
    Regular,
    Post,
    Closed,
    #[serde(rename = "pre-30m")]
    Pre30m,
    #[serde(rename = "pre-5m")]
    Pre5m,
    #[serde(rename = "pre-1m")]
    Pre1m,
}

impl From<SessionKind> for SessionStatus {
    fn from(kind: SessionKind) -> Self {
        match kind {
            SessionKind::Pre => SessionStatus::Pre,
            SessionKind::Regular => SessionStatus::Regular,
            SessionKind::Post => SessionStatus::Post,
            SessionKind::Closed => SessionStatus::Closed,
        }
    }
}

/// Today's opening (and `closed`'s closing) times for whichever sessions
/// run today, per `GetChangeSessionTime`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChangeTimes {
    pub pre: Option<NaiveTime>,
    pub regular: Option<NaiveTime>,
    pub post: Option<NaiveTime>,
    pub closed: Option<NaiveTime>,
}

fn weekday_name(now: &NaiveDateTime) -> &'static str {
    match now.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}

/// The three sessions in effect for `now`'s date: the anniversary override
/// if today matches one, else the weekday template.
fn sessions_for(cfg: &ExchangeConfig, now: &NaiveDateTime) -> (Session, Session, Session) {
    let date = now.format("%Y-%m-%d").to_string();
    if let Some(ann) = cfg.anniversary_on(&date) {
        return (
            ann.pre_market_sessions.clone(),
            ann.regular_trading_sessions.clone(),
            ann.post_market_sessions.clone(),
        );
    }
    let weekday = weekday_name(now);
    (
        cfg.pre_market_sessions.get(weekday).cloned().unwrap_or_default(),
        cfg.regular_trading_sessions.get(weekday).cloned().unwrap_or_default(),
        cfg.post_market_sessions.get(weekday).cloned().unwrap_or_default(),
    )
}

fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

fn in_session(session: &Session, current: NaiveTime) -> bool {
    match (&session.open, &session.close) {
        (Some(open), Some(close)) => match (parse_hhmm(open), parse_hhmm(close)) {
            (Some(open), Some(close)) => current >= open && current < close,
            _ => false,
        },
        _ => false,
    }
}

/// Derives the current session by checking, in order, pre-market, regular,
/// then post-market; falling through to `closed` (spec §4.3).
pub fn current_session(cfg: &ExchangeConfig, now: NaiveDateTime) -> SessionKind {
    let (pre, regular, post) = sessions_for(cfg, &now);
    let current_time = now.time();

    if in_session(&pre, current_time) {
        return SessionKind::Pre;
    }
    if in_session(&regular, current_time) {
        return SessionKind::Regular;
    }
    if in_session(&post, current_time) {
        return SessionKind::Post;
    }
    SessionKind::Closed
}

/// Today's opening times for whichever sessions run, plus the `closed`
/// transition derived from the post-market close (spec §4.3, SPEC_FULL
/// supplement matching `GetChangeSessionTime`'s inclusion of
/// `changeTimes["closed"]`).
pub fn next_change_times(cfg: &ExchangeConfig, now: NaiveDateTime) -> ChangeTimes {
    let (pre, regular, post) = sessions_for(cfg, &now);
    ChangeTimes {
        pre: pre.open.as_deref().and_then(parse_hhmm),
        regular: regular.open.as_deref().and_then(parse_hhmm),
        post: post.open.as_deref().and_then(parse_hhmm),
        closed: post.close.as_deref().and_then(parse_hhmm),
    }
}
