//! Region group commands.

use crate::abstract_editor::{
    CoalesceContext, EditAction, EditActionError, EditActionResult, PROPERTY_COALESCE_TIME_MS,
};
use crate::document::MapDocument;
use crate::map::{RegionGroup, RegionGroupId, RegionProperties, RoomId};

#[derive(Debug, Clone)]
pub struct CreateRegionCommand {
    group: RegionGroup,
    description: String,
}

impl CreateRegionCommand {
    pub fn new(group: RegionGroup) -> Self {
        let description = format!("Create Region: {}", group.name);
        Self { group, description }
    }
}

impl EditAction<MapDocument> for CreateRegionCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        if !target.add_region_group(self.group.clone()) {
            return Err(EditActionError::InvalidState(format!(
                "region group {} already exists",
                self.group.id
            )));
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        target.remove_region_group(self.group.id.as_str());
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Deletes a region group. Undo re-attaches the rooms it orphaned.
#[derive(Debug, Clone)]
pub struct DeleteRegionCommand {
    region_id: RegionGroupId,
    saved: Option<(usize, RegionGroup, Vec<RoomId>)>,
    description: String,
}

impl DeleteRegionCommand {
    pub fn new(region_id: RegionGroupId) -> Self {
        Self {
            region_id,
            saved: None,
            description: "Delete Region".to_owned(),
        }
    }
}

impl EditAction<MapDocument> for DeleteRegionCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        self.saved = target.remove_region_group(self.region_id.as_str());
        if let Some((_, group, _)) = &self.saved {
            self.description = format!("Delete Region: {}", group.name);
        }
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        let Some((index, group, orphaned)) = &self.saved else {
            return Ok(());
        };
        target.insert_region_group_at(*index, group.clone());
        for room_id in orphaned {
            if let Some(room) = target.find_room_mut(room_id.as_str()) {
                room.parent_region_group_id = Some(group.id.clone());
            }
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Name, description and tag edits on one region group.
#[derive(Debug, Clone)]
pub struct ModifyRegionPropertiesCommand {
    region_id: RegionGroupId,
    old: RegionProperties,
    new: RegionProperties,
    description: String,
}

impl ModifyRegionPropertiesCommand {
    pub fn new(region_id: RegionGroupId, old: RegionProperties, new: RegionProperties) -> Self {
        let description = format!("Modify Region: {}", new.name);
        Self {
            region_id,
            old,
            new,
            description,
        }
    }

    fn write(target: &mut MapDocument, region_id: &RegionGroupId, props: &RegionProperties) {
        match target.find_region_group_mut(region_id.as_str()) {
            Some(group) => props.apply_to(group),
            None => log::debug!("Region group {region_id} not found, properties skipped"),
        }
    }
}

impl EditAction<MapDocument> for ModifyRegionPropertiesCommand {
    fn apply(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.region_id, &self.new);
        Ok(())
    }

    fn undo(&mut self, target: &mut MapDocument) -> EditActionResult {
        Self::write(target, &self.region_id, &self.old);
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn coalesce(&mut self, other: Self, _ctx: &CoalesceContext) -> Option<Self> {
        if other.region_id != self.region_id {
            return Some(other);
        }
        self.new = other.new;
        self.description = other.description;
        None
    }

    fn coalesce_window_ms(&self) -> u64 {
        PROPERTY_COALESCE_TIME_MS
    }
}
