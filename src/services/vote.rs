use serde::Serialize;

use crate::models::comic::Comic;
use crate::models::error::GalleryError;

/// The two recognized vote actions. Anything else on the wire is rejected
/// with `InvalidAction` before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteAction {
    Like,
    Dislike,
}

impl VoteAction {
    pub fn parse(raw: &str) -> Result<Self, GalleryError> {
        match raw {
            "like" => Ok(VoteAction::Like),
            "dislike" => Ok(VoteAction::Dislike),
            other => Err(GalleryError::InvalidAction(other.to_string())),
        }
    }
}

/// Vote state reported back to the caller after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub likes: u64,
    pub dislikes: u64,
    pub has_liked: bool,
    pub has_disliked: bool,
}

/// Toggle-vote transition for a single (comic, voter) pair.
///
/// A repeated identical action undoes itself; an opposite action swaps the
/// vote, clearing the old one. Counters are recomputed from the sets after
/// the mutation, so they can never drift or go negative.
pub fn apply_vote(comic: &mut Comic, voter: &str, action: VoteAction) -> VoteOutcome {
    match action {
        VoteAction::Like => {
            if comic.liked_by.contains(voter) {
                comic.liked_by.remove(voter);
            } else {
                comic.disliked_by.remove(voter);
                comic.liked_by.insert(voter.to_string());
            }
        }
        VoteAction::Dislike => {
            if comic.disliked_by.contains(voter) {
                comic.disliked_by.remove(voter);
            } else {
                comic.liked_by.remove(voter);
                comic.disliked_by.insert(voter.to_string());
            }
        }
    }
    comic.recount();

    VoteOutcome {
        likes: comic.likes,
        dislikes: comic.dislikes,
        has_liked: comic.has_liked(voter),
        has_disliked: comic.has_disliked(voter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn fresh_comic() -> Comic {
        Comic {
            id: "c1".to_string(),
            title: "Test Comic".to_string(),
            creator_id: "u1".to_string(),
            creator_address: "0xcreator".to_string(),
            image_url: "/images/c1.png".to_string(),
            settings: serde_json::json!({}),
            is_public: true,
            likes: 0,
            dislikes: 0,
            liked_by: BTreeSet::new(),
            disliked_by: BTreeSet::new(),
            created_at: Utc::now(),
        }
    }

    fn assert_counts_match_sets(comic: &Comic) {
        assert_eq!(comic.likes, comic.liked_by.len() as u64);
        assert_eq!(comic.dislikes, comic.disliked_by.len() as u64);
        assert!(comic.liked_by.intersection(&comic.disliked_by).next().is_none());
    }

    #[test]
    fn like_then_dislike_then_dislike_again() {
        let mut comic = fresh_comic();

        let out = apply_vote(&mut comic, "0xa", VoteAction::Like);
        assert_eq!(
            out,
            VoteOutcome { likes: 1, dislikes: 0, has_liked: true, has_disliked: false }
        );

        let out = apply_vote(&mut comic, "0xa", VoteAction::Dislike);
        assert_eq!(
            out,
            VoteOutcome { likes: 0, dislikes: 1, has_liked: false, has_disliked: true }
        );

        let out = apply_vote(&mut comic, "0xa", VoteAction::Dislike);
        assert_eq!(
            out,
            VoteOutcome { likes: 0, dislikes: 0, has_liked: false, has_disliked: false }
        );
    }

    #[test]
    fn double_like_is_a_toggle() {
        let mut comic = fresh_comic();
        apply_vote(&mut comic, "0xa", VoteAction::Like);
        let out = apply_vote(&mut comic, "0xa", VoteAction::Like);
        assert_eq!(
            out,
            VoteOutcome { likes: 0, dislikes: 0, has_liked: false, has_disliked: false }
        );
        assert!(comic.liked_by.is_empty());
    }

    #[test]
    fn dislike_clears_existing_like() {
        let mut comic = fresh_comic();
        apply_vote(&mut comic, "0xa", VoteAction::Like);
        let out = apply_vote(&mut comic, "0xa", VoteAction::Dislike);
        assert!(!out.has_liked);
        assert!(out.has_disliked);
        assert_eq!(out.likes, 0);
        assert_eq!(out.dislikes, 1);
    }

    #[test]
    fn votes_from_different_voters_accumulate() {
        let mut comic = fresh_comic();
        apply_vote(&mut comic, "0xa", VoteAction::Like);
        apply_vote(&mut comic, "0xb", VoteAction::Like);
        let out = apply_vote(&mut comic, "0xc", VoteAction::Dislike);
        assert_eq!(out.likes, 2);
        assert_eq!(out.dislikes, 1);
        assert!(!out.has_liked);
        assert!(out.has_disliked);
        assert_counts_match_sets(&comic);
    }

    #[test]
    fn invariants_hold_across_arbitrary_sequences() {
        let actions = [
            VoteAction::Like,
            VoteAction::Like,
            VoteAction::Dislike,
            VoteAction::Like,
            VoteAction::Dislike,
            VoteAction::Dislike,
            VoteAction::Like,
        ];
        let mut comic = fresh_comic();
        for action in actions {
            let out = apply_vote(&mut comic, "0xa", action);
            assert_counts_match_sets(&comic);
            assert!(!(out.has_liked && out.has_disliked));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = VoteAction::parse("upvote").unwrap_err();
        assert!(matches!(err, GalleryError::InvalidAction(_)));
        assert!(VoteAction::parse("like").is_ok());
        assert!(VoteAction::parse("dislike").is_ok());
    }
}
