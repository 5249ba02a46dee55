//! Project-level registry of LED walls.
//!
//! The project owns every [`WallSettings`] record and is the only place a
//! wall can be mutated. It enforces the linkage rules between walls:
//!
//! - `reference_wall` and `verification_wall` must name another existing wall;
//! - a primary wall and its verification wall point at each other, and the
//!   verification wall carries `is_verification_wall = true`;
//! - writes to a mirrored field of a primary wall are applied to its
//!   verification wall too, atomically;
//! - writes to a mirrored field of a verification wall are dropped.
//!
//! # Example
//!
//! ```rust
//! use vpcal_core::{Project, WallField};
//!
//! let mut project = Project::new();
//! project.add_wall("Main").unwrap();
//! project.add_verification_wall("Main", "Main_Verify").unwrap();
//!
//! project.set("Main", WallField::TargetMaxLumNits, 1500).unwrap();
//! assert_eq!(project.wall("Main_Verify").unwrap().target_max_lum_nits(), 1500);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SettingsError, SettingsResult};
use crate::settings::{SettingValue, WallField, WallSettings};

/// Ordered, name-keyed collection of walls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "led_walls", default)]
    walls: Vec<WallSettings>,
}

impl Project {
    /// Creates an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of walls.
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    /// True when the project holds no walls.
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    /// Walls in insertion order.
    pub fn walls(&self) -> impl Iterator<Item = &WallSettings> {
        self.walls.iter()
    }

    /// True if a wall with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.walls.iter().any(|w| w.name() == name)
    }

    /// Looks up a wall by name.
    pub fn wall(&self, name: &str) -> SettingsResult<&WallSettings> {
        self.index_of(name).map(|i| &self.walls[i])
    }

    /// Primary wall of a verification wall.
    pub fn primary_of(&self, name: &str) -> Option<&WallSettings> {
        let wall = self.wall(name).ok()?;
        if !wall.is_verification_wall() {
            return None;
        }
        self.wall(wall.verification_wall()).ok()
    }

    /// Adds a wall with default settings.
    pub fn add_wall(&mut self, name: &str) -> SettingsResult<&WallSettings> {
        if name.is_empty() {
            return Err(SettingsError::invalid_value(
                WallField::Name.as_str(),
                "wall name cannot be empty",
            ));
        }
        if self.contains(name) {
            return Err(SettingsError::DuplicateWall {
                name: name.to_string(),
            });
        }
        self.walls.push(WallSettings::new(name));
        debug!(wall = name, "added wall");
        Ok(&self.walls[self.walls.len() - 1])
    }

    /// Adds a new wall and links it as the verification wall of `primary`.
    pub fn add_verification_wall(
        &mut self,
        primary: &str,
        name: &str,
    ) -> SettingsResult<&WallSettings> {
        // fail before adding anything
        let p = self.index_of(primary)?;
        if self.walls[p].is_verification_wall() {
            return Err(SettingsError::VerificationWall {
                name: primary.to_string(),
            });
        }
        self.add_wall(name)?;
        self.link_verification_wall(primary, name)?;
        self.wall(name)
    }

    /// Removes a wall and clears every link pointing at it.
    pub fn remove_wall(&mut self, name: &str) -> SettingsResult<WallSettings> {
        let idx = self.index_of(name)?;
        let removed = self.walls.remove(idx);
        for wall in &mut self.walls {
            if wall.reference_wall() == name {
                wall.set_reference_wall(String::new());
            }
            if wall.verification_wall() == name {
                wall.set_link(String::new(), false);
            }
        }
        debug!(wall = name, "removed wall");
        Ok(removed)
    }

    /// Renames a wall and rewrites links that referenced the old name.
    pub fn rename_wall(&mut self, old: &str, new: &str) -> SettingsResult<()> {
        let idx = self.index_of(old)?;
        if old == new {
            return Ok(());
        }
        if new.is_empty() {
            return Err(SettingsError::invalid_value(
                WallField::Name.as_str(),
                "wall name cannot be empty",
            ));
        }
        if self.contains(new) {
            return Err(SettingsError::DuplicateWall {
                name: new.to_string(),
            });
        }
        self.walls[idx].set_name(new.to_string());
        for wall in &mut self.walls {
            if wall.reference_wall() == old {
                wall.set_reference_wall(new.to_string());
            }
            if wall.verification_wall() == old {
                let is_verification = wall.is_verification_wall();
                wall.set_link(new.to_string(), is_verification);
            }
        }
        debug!(old, new, "renamed wall");
        Ok(())
    }

    /// Writes a single setting on a wall.
    ///
    /// This is the single mutation entry point. All checks run before any
    /// record changes; on error the project is left untouched.
    pub fn set(
        &mut self,
        wall: &str,
        field: WallField,
        value: impl Into<SettingValue>,
    ) -> SettingsResult<()> {
        let value = value.into();
        let idx = self.index_of(wall)?;

        match field {
            WallField::Name => return self.rename_wall(wall, &text_value(field, &value)?),
            WallField::VerificationWall => {
                let target = text_value(field, &value)?;
                if target.is_empty() {
                    return self.unlink_verification_wall(wall);
                }
                return self.link_verification_wall(wall, &target);
            }
            WallField::IsVerificationWall => {
                if value != SettingValue::Bool(self.walls[idx].is_verification_wall()) {
                    return Err(SettingsError::InvalidLink {
                        wall: wall.to_string(),
                        reason: "is_verification_wall follows the wall links; use link_verification_wall"
                            .to_string(),
                    });
                }
                return Ok(());
            }
            WallField::ReferenceWall => {
                let target = text_value(field, &value)?;
                if !target.is_empty() && target != wall && !self.contains(&target) {
                    return Err(SettingsError::not_found(target));
                }
            }
            _ => {}
        }

        if !field.is_unique() && self.walls[idx].is_verification_wall() {
            debug!(
                wall,
                field = field.as_str(),
                "ignoring write to mirrored field of verification wall"
            );
            return Ok(());
        }

        let mut updated = self.walls[idx].clone();
        updated.apply(field, &value)?;

        let mirror = if !field.is_unique() && !updated.verification_wall().is_empty() {
            let v = self.index_of(updated.verification_wall())?;
            let mut linked = self.walls[v].clone();
            linked.apply(field, &value)?;
            Some((v, linked))
        } else {
            None
        };

        self.walls[idx] = updated;
        if let Some((v, linked)) = mirror {
            debug!(
                wall,
                verification = linked.name(),
                field = field.as_str(),
                "propagated to verification wall"
            );
            self.walls[v] = linked;
        }
        Ok(())
    }

    /// Writes a setting from its text form, as typed on a command line.
    pub fn set_str(&mut self, wall: &str, key: &str, raw: &str) -> SettingsResult<()> {
        let field = key
            .parse::<WallField>()
            .map_err(|_| SettingsError::UnknownField {
                name: key.to_string(),
            })?;
        let value = SettingValue::parse_for(field, raw)?;
        self.set(wall, field, value)
    }

    /// Links `verification` as the verification wall of `primary`.
    ///
    /// Both walls point at each other afterwards, and every mirrored field
    /// of the primary is copied onto the verification wall. Any previous
    /// partner of either wall is unlinked.
    pub fn link_verification_wall(
        &mut self,
        primary: &str,
        verification: &str,
    ) -> SettingsResult<()> {
        if primary == verification {
            return Err(SettingsError::InvalidLink {
                wall: primary.to_string(),
                reason: "a wall cannot verify itself".to_string(),
            });
        }
        let p = self.index_of(primary)?;
        let v = self.index_of(verification)?;
        if self.walls[p].is_verification_wall() {
            return Err(SettingsError::VerificationWall {
                name: primary.to_string(),
            });
        }
        let target = &self.walls[v];
        if !target.is_verification_wall() && !target.verification_wall().is_empty() {
            return Err(SettingsError::InvalidLink {
                wall: verification.to_string(),
                reason: format!(
                    "already has its own verification wall '{}'",
                    target.verification_wall()
                ),
            });
        }

        let old_partners = [
            self.walls[p].verification_wall().to_string(),
            self.walls[v].verification_wall().to_string(),
        ];
        for old in old_partners {
            if old.is_empty() || old == primary || old == verification {
                continue;
            }
            if let Ok(i) = self.index_of(&old) {
                self.walls[i].set_link(String::new(), false);
            }
        }

        let mut mirrored = self.walls[v].mirrored_from(&self.walls[p]);
        mirrored.set_link(primary.to_string(), true);
        self.walls[v] = mirrored;
        self.walls[p].set_link(verification.to_string(), false);
        info!(primary, verification, "linked verification wall");
        Ok(())
    }

    /// Breaks the primary/verification pairing a wall takes part in.
    pub fn unlink_verification_wall(&mut self, wall: &str) -> SettingsResult<()> {
        let idx = self.index_of(wall)?;
        let partner = self.walls[idx].verification_wall().to_string();
        self.walls[idx].set_link(String::new(), false);
        if let Ok(i) = self.index_of(&partner) {
            self.walls[i].set_link(String::new(), false);
        }
        Ok(())
    }

    /// Resets a wall's mirrored fields to their defaults.
    ///
    /// Unique fields (name, links, plate folder, roi) are kept. Clearing a
    /// primary also clears its verification wall; clearing a verification
    /// wall directly does nothing.
    pub fn clear_wall(&mut self, name: &str) -> SettingsResult<()> {
        let idx = self.index_of(name)?;
        if self.walls[idx].is_verification_wall() {
            debug!(wall = name, "ignoring clear of verification wall");
            return Ok(());
        }
        let cleared = self.walls[idx].cleared();
        if let Ok(v) = self.index_of(cleared.verification_wall()) {
            self.walls[v] = self.walls[v].mirrored_from(&cleared);
        }
        self.walls[idx] = cleared;
        Ok(())
    }

    /// Checks every cross-wall invariant.
    pub fn validate(&self) -> SettingsResult<()> {
        for (i, wall) in self.walls.iter().enumerate() {
            if self.walls[..i].iter().any(|w| w.name() == wall.name()) {
                return Err(SettingsError::DuplicateWall {
                    name: wall.name().to_string(),
                });
            }
            wall.check_record()?;
            if !wall.reference_wall().is_empty() {
                self.wall(wall.reference_wall())?;
            }
            if !wall.verification_wall().is_empty() {
                let partner = self.wall(wall.verification_wall())?;
                let paired = partner.verification_wall() == wall.name()
                    && partner.is_verification_wall() != wall.is_verification_wall();
                if !paired {
                    return Err(SettingsError::InvalidLink {
                        wall: wall.name().to_string(),
                        reason: format!(
                            "'{}' does not link back as its pair",
                            partner.name()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Serializes the project as `{"led_walls": [...]}`.
    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses and validates a project.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let project: Self = serde_json::from_str(json)?;
        project.validate()?;
        Ok(project)
    }

    /// Loads a project file.
    pub fn load(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Saves the project file.
    pub fn save(&self, path: impl AsRef<Path>) -> SettingsResult<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        info!(path = %path.as_ref().display(), walls = self.walls.len(), "saved project");
        Ok(())
    }

    fn index_of(&self, name: &str) -> SettingsResult<usize> {
        self.walls
            .iter()
            .position(|w| w.name() == name)
            .ok_or_else(|| SettingsError::not_found(name))
    }
}

fn text_value(field: WallField, value: &SettingValue) -> SettingsResult<String> {
    match value {
        SettingValue::Text(s) => Ok(s.clone()),
        other => Err(SettingsError::invalid_value(
            field.as_str(),
            format!("expected text, got {other:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_wall_rejects_duplicates() {
        let mut project = Project::new();
        project.add_wall("A").unwrap();
        let err = project.add_wall("A").unwrap_err();
        assert!(matches!(err, SettingsError::DuplicateWall { .. }));
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn unknown_wall() {
        let mut project = Project::new();
        let err = project
            .set("Nope", WallField::AvoidClipping, false)
            .unwrap_err();
        assert!(matches!(err, SettingsError::WallNotFound { .. }));
    }

    #[test]
    fn reference_wall_must_exist() {
        let mut project = Project::new();
        project.add_wall("A").unwrap();
        let err = project
            .set("A", WallField::ReferenceWall, "Ghost")
            .unwrap_err();
        assert!(matches!(err, SettingsError::WallNotFound { .. }));

        project.add_wall("B").unwrap();
        project.set("A", WallField::ReferenceWall, "B").unwrap();
        assert_eq!(project.wall("A").unwrap().reference_wall(), "B");
    }

    #[test]
    fn set_str_parses_by_field() {
        let mut project = Project::new();
        project.add_wall("A").unwrap();
        project.set_str("A", "target_eotf", "gamma 2.4").unwrap();
        project.set_str("A", "roi", "0,0,100,100").unwrap();
        let wall = project.wall("A").unwrap();
        assert_eq!(wall.target_eotf().as_str(), "gamma 2.4");
        assert_eq!(wall.roi(), &[0, 0, 100, 100]);

        let err = project.set_str("A", "colour", "red").unwrap_err();
        assert!(matches!(err, SettingsError::UnknownField { .. }));
    }

    #[test]
    fn is_verification_wall_follows_links() {
        let mut project = Project::new();
        project.add_wall("A").unwrap();
        project.set("A", WallField::IsVerificationWall, false).unwrap();
        assert!(project
            .set("A", WallField::IsVerificationWall, true)
            .is_err());
    }
}
