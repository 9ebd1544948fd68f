//! Ranking helpers shared by the daily leaderboard and the ping scan.

use crate::models::UserId;

/// Sort `(user, count)` pairs by count descending, then user id ascending,
/// dropping zero counts.
pub(crate) fn rank<I>(counts: I) -> Vec<(UserId, u64)>
where
    I: IntoIterator<Item = (UserId, u64)>,
{
    let mut ranked: Vec<(UserId, u64)> = counts.into_iter().filter(|(_, n)| *n > 0).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}
