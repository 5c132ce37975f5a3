/// A resource with a platform identifier.
///
/// Each contract fixes `Id` to the matching serenity id type, so a
/// `dyn Channel` yields a `ChannelId` and a `dyn Message` a `MessageId`.
pub trait Entity {
    type Id: Copy + Eq + std::fmt::Debug;

    fn id(&self) -> Self::Id;
}
