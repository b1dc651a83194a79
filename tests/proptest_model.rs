//! Property-based tests for the derived branch/worktree predicates.
//!
//! Run with: cargo test --test proptest_model

use proptest::prelude::*;

use reposcope::git::model::{
    can_delete, needs_attention, suggest_cleanup, CLEANUP_PROTECTED,
};

proptest! {
    /// `needsAttention` is exactly the disjunction of the three counters —
    /// for any combination, including all-zero.
    #[test]
    fn needs_attention_matches_its_definition(
        uncommitted in 0u64..10_000,
        ahead in 0u64..10_000,
        behind in 0u64..10_000,
    ) {
        prop_assert_eq!(
            needs_attention(uncommitted, ahead, behind),
            uncommitted > 0 || ahead > 0 || behind > 0
        );
    }

    /// A fully clean, fully synced worktree is never flagged.
    #[test]
    fn clean_and_synced_is_never_flagged(_seed in 0u8..8) {
        prop_assert!(!needs_attention(0, 0, 0));
    }

    /// Protected names are never deletable, whatever the branch state.
    #[test]
    fn protected_names_are_never_deletable(
        merged in any::<bool>(),
        current in any::<bool>(),
        idx in 0usize..3,
    ) {
        prop_assert!(!can_delete(merged, current, CLEANUP_PROTECTED[idx]));
    }

    /// For unprotected names, deletability is exactly merged-and-not-current.
    #[test]
    fn unprotected_deletability_matches_definition(
        merged in any::<bool>(),
        current in any::<bool>(),
        name in "[a-z]{1,12}/[a-z]{1,12}",
    ) {
        prop_assume!(!CLEANUP_PROTECTED.contains(&name.as_str()));
        prop_assert_eq!(can_delete(merged, current, &name), merged && !current);
    }

    /// Cleanup suggestions are monotone in age: once suggested, staying
    /// idle longer never un-suggests.
    #[test]
    fn suggest_cleanup_is_monotone_in_age(
        merged in any::<bool>(),
        age in 0i64..400,
        extra in 0i64..400,
    ) {
        if suggest_cleanup(merged, age) {
            prop_assert!(suggest_cleanup(merged, age + extra));
        }
    }

    /// The merged threshold (30 days) is strictly tighter than the
    /// unmerged one (90 days).
    #[test]
    fn merged_threshold_is_tighter(age in 31i64..=90) {
        prop_assert!(suggest_cleanup(true, age));
        prop_assert!(!suggest_cleanup(false, age));
    }
}
