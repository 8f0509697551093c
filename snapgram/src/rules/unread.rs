use crate::models::ChatRoom;

/// Sums `user_id`'s unread counter over every room they participate in.
pub fn total_unread<'a, I>(rooms: I, user_id: &str) -> i64
where
    I: IntoIterator<Item = &'a ChatRoom>,
{
    rooms
        .into_iter()
        .filter(|room| room.includes(user_id))
        .map(|room| room.unread_for(user_id))
        .sum()
}
