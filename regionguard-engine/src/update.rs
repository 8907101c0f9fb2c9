use crate::error::EngineResult;
use regionguard_flags::{FlagRegistry, FlagSetting};
use regionguard_geometry::Shape;
use regionguard_store::WorldRegionSet;
use regionguard_types::{ActorId, RegionId};

/// One change to an existing region.
///
/// A batch passed to
/// [`RegionEngine::update_region`](crate::RegionEngine::update_region) is
/// applied in order to a private copy and published only if every update
/// succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionUpdate {
    SetPriority(i32),
    SetShape(Shape),
    SetParent(Option<RegionId>),
    /// An empty setting clears the flag.
    SetFlag { flag: String, setting: FlagSetting },
    ClearFlag(String),
    AddOwner(ActorId),
    RemoveOwner(ActorId),
    AddMember(ActorId),
    RemoveMember(ActorId),
    AddOwnerGroup(String),
    RemoveOwnerGroup(String),
    AddMemberGroup(String),
    RemoveMemberGroup(String),
}

impl RegionUpdate {
    pub(crate) fn apply(&self, set: &mut WorldRegionSet, id: &RegionId, registry: &FlagRegistry) -> EngineResult<()> {
        match self {
            Self::SetPriority(p) => set.set_priority(id, *p)?,
            Self::SetShape(shape) => set.set_shape(id, shape.clone())?,
            Self::SetParent(parent) => set.set_parent(id, parent.as_ref())?,
            Self::SetFlag { flag, setting } => {
                let def = registry.require(flag)?;
                for value in setting.values() {
                    def.validate(value)?;
                }
                set.set_flag(id, &def.name, setting.clone())?;
            }
            Self::ClearFlag(flag) => {
                set.clear_flag(id, flag)?;
            }
            Self::AddOwner(actor) => {
                set.add_owner(id, *actor)?;
            }
            Self::RemoveOwner(actor) => {
                set.remove_owner(id, actor)?;
            }
            Self::AddMember(actor) => {
                set.add_member(id, *actor)?;
            }
            Self::RemoveMember(actor) => {
                set.remove_member(id, actor)?;
            }
            Self::AddOwnerGroup(group) => {
                set.owners_mut(id)?.add_group(group);
            }
            Self::RemoveOwnerGroup(group) => {
                set.owners_mut(id)?.remove_group(group);
            }
            Self::AddMemberGroup(group) => {
                set.members_mut(id)?.add_group(group);
            }
            Self::RemoveMemberGroup(group) => {
                set.members_mut(id)?.remove_group(group);
            }
        }
        Ok(())
    }
}
