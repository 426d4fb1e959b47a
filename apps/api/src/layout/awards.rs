//! Award selection — picks the stories that headline the page.
//!
//! Three independent rankings each crown one winner:
//! - Combined (`10 - zero_echo + impact`, descending) → `Award::Headline`
//! - Zero-echo (ascending, near-ties broken by impact) → `Award::ZeroEcho`
//! - Impact (descending) → `Award::HotTopic`
//!
//! The featured list is the set of distinct winners in that order. When one story
//! sweeps several categories the list shrinks; it is never padded with runners-up.
//! Ties always go to the earlier article in input order.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::article::Article;

/// Zero-echo scores closer than this are treated as equal.
const ZERO_ECHO_TIE_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Award {
    #[serde(rename = "Today's Headline")]
    Headline,
    #[serde(rename = "Zero Echo Award")]
    ZeroEcho,
    #[serde(rename = "Hot Topic")]
    HotTopic,
}

impl Award {
    /// Label shown on the card badge.
    pub fn label(self) -> &'static str {
        match self {
            Award::Headline => "Today's Headline",
            Award::ZeroEcho => "Zero Echo Award",
            Award::HotTopic => "Hot Topic",
        }
    }
}

/// Outcome of award selection, indexed by position in the input slice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AwardSelection {
    /// `awards[i]` lists the awards won by article `i`, in category order.
    pub awards: Vec<Vec<Award>>,
    /// Indices of the distinct winners: headline first, then zero-echo, then impact.
    pub featured: Vec<usize>,
}

impl AwardSelection {
    pub fn headline(&self) -> Option<usize> {
        self.featured.first().copied()
    }
}

/// Selects award winners. Empty input yields an empty selection.
pub fn select_awards(articles: &[Article]) -> AwardSelection {
    let mut selection = AwardSelection {
        awards: vec![Vec::new(); articles.len()],
        featured: Vec::new(),
    };

    let winners = [
        (Award::Headline, combined_winner(articles)),
        (Award::ZeroEcho, zero_echo_winner(articles)),
        (Award::HotTopic, impact_winner(articles)),
    ];

    for (award, winner) in winners {
        let Some(idx) = winner else { continue };
        selection.awards[idx].push(award);
        if !selection.featured.contains(&idx) {
            selection.featured.push(idx);
        }
    }

    selection
}

/// Indices ordered by combined score, highest first. Stable on ties.
pub fn rank_by_combined(articles: &[Article]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..articles.len()).collect();
    order.sort_by(|&a, &b| {
        articles[b]
            .combined_score()
            .total_cmp(&articles[a].combined_score())
    });
    order
}

fn combined_winner(articles: &[Article]) -> Option<usize> {
    rank_by_combined(articles).first().copied()
}

/// Lowest zero-echo score wins; scores within `ZERO_ECHO_TIE_EPSILON` fall back to
/// the higher impact score.
///
/// The epsilon comparison is not transitive, so this is a single left-to-right
/// scan rather than a sort: a challenger replaces the current best only when it
/// is strictly better.
fn zero_echo_winner(articles: &[Article]) -> Option<usize> {
    best_by(articles, |challenger, best| {
        let delta = challenger.zero_echo() - best.zero_echo();
        if delta.abs() < ZERO_ECHO_TIE_EPSILON {
            challenger.impact().total_cmp(&best.impact())
        } else {
            best.zero_echo().total_cmp(&challenger.zero_echo())
        }
    })
}

fn impact_winner(articles: &[Article]) -> Option<usize> {
    best_by(articles, |challenger, best| {
        challenger.impact().total_cmp(&best.impact())
    })
}

/// Returns the index of the first article no later article beats.
/// `better(challenger, best)` returns `Greater` when the challenger should win.
fn best_by<F>(articles: &[Article], better: F) -> Option<usize>
where
    F: Fn(&Article, &Article) -> Ordering,
{
    let mut best: Option<usize> = None;
    for (idx, article) in articles.iter().enumerate() {
        match best {
            None => best = Some(idx),
            Some(current) => {
                if better(article, &articles[current]) == Ordering::Greater {
                    best = Some(idx);
                }
            }
        }
    }
    best
}
