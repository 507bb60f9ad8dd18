//! Object store and versioning state of one in-memory repository.

use std::collections::{BTreeMap, HashMap};

use jiff::Timestamp;
use uuid::Uuid;

use crate::binding::merge_secondary_types;
use crate::types::{
    BaseTypeId, CheckIn, ContentStream, ObjectData, ObjectId, Page, PageRequest, Properties,
    PropertyValue, RepositoryCapabilities, RepositoryDescriptor, TypeDefinition, VersioningState,
    WriteMode, property_ids as ids,
};
use crate::{Error, Result};

/// Entry in a folder's child list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Child {
    Folder(ObjectId),
    /// Documents are filed by version series; listings show the latest version.
    Series(String),
}

#[derive(Debug, Clone)]
enum StoredKind {
    Folder {
        children: Vec<Child>,
    },
    Document {
        series_id: String,
        content: Option<ContentStream>,
    },
}

#[derive(Debug, Clone)]
struct StoredObject {
    /// Caller-visible properties; derived properties are added on read.
    properties: Properties,
    parent: Option<ObjectId>,
    kind: StoredKind,
    change_token: u64,
}

#[derive(Debug, Clone, Default)]
struct VersionSeries {
    /// Checked-in versions, oldest first.
    versions: Vec<ObjectId>,
    pwc: Option<ObjectId>,
    checked_out_by: Option<String>,
}

/// Complete state of one repository.
#[derive(Debug, Clone)]
pub(crate) struct RepositoryState {
    descriptor: RepositoryDescriptor,
    types: BTreeMap<String, TypeDefinition>,
    objects: HashMap<ObjectId, StoredObject>,
    series: HashMap<String, VersionSeries>,
    user: String,
}

impl RepositoryState {
    pub(crate) fn new(
        id: &str,
        name: &str,
        user: &str,
        types: BTreeMap<String, TypeDefinition>,
    ) -> Self {
        let root_id = ObjectId::new(Uuid::now_v7().to_string());

        let mut descriptor = RepositoryDescriptor::new(id, name, root_id.clone());
        descriptor.product_name = Some("cmis-core in-memory repository".to_owned());
        descriptor.product_version = Some(env!("CARGO_PKG_VERSION").to_owned());
        descriptor.cmis_version = Some("1.1".to_owned());
        descriptor.capabilities = RepositoryCapabilities {
            get_descendants: false,
            pwc_updatable: true,
            all_versions_searchable: false,
            content_stream_updatability: Some("pwconly".to_owned()),
        };

        let now = Timestamp::now();
        let properties = Properties::new()
            .with(ids::OBJECT_ID, PropertyValue::Id(root_id.to_string()))
            .with(ids::NAME, "Company Home")
            .with(ids::OBJECT_TYPE_ID, PropertyValue::Id(BaseTypeId::Folder.as_ref().to_owned()))
            .with(ids::BASE_TYPE_ID, PropertyValue::Id(BaseTypeId::Folder.as_ref().to_owned()))
            .with(ids::CREATED_BY, "System")
            .with(ids::CREATION_DATE, now)
            .with(ids::LAST_MODIFIED_BY, "System")
            .with(ids::LAST_MODIFICATION_DATE, now);

        let root = StoredObject {
            properties,
            parent: None,
            kind: StoredKind::Folder {
                children: Vec::new(),
            },
            change_token: 0,
        };

        Self {
            descriptor,
            types,
            objects: HashMap::from([(root_id, root)]),
            series: HashMap::new(),
            user: user.to_owned(),
        }
    }

    pub(crate) fn descriptor(&self) -> &RepositoryDescriptor {
        &self.descriptor
    }

    pub(crate) fn register_type(&mut self, definition: TypeDefinition) {
        self.types.insert(definition.id.clone(), definition);
    }

    pub(crate) fn type_definition(&self, type_id: &str) -> Result<TypeDefinition> {
        self.types.get(type_id).cloned().ok_or_else(|| {
            Error::unknown_type().with_message(format!("type '{type_id}' is not registered"))
        })
    }

    pub(crate) fn object(&self, id: &ObjectId) -> Result<ObjectData> {
        self.stored(id)?;
        Ok(self.snapshot(id))
    }

    pub(crate) fn children(&self, folder_id: &ObjectId, page: PageRequest) -> Result<Page<ObjectData>> {
        let children = self.folder_children(folder_id)?;
        let total = children.len() as u64;

        let items: Vec<ObjectData> = children
            .iter()
            .filter_map(|child| self.child_representative(child))
            .skip(page.skip_count as usize)
            .take(page.max_items as usize)
            .map(|id| self.snapshot(&id))
            .collect();

        let has_more_items = page.skip_count + (items.len() as u64) < total;
        Ok(Page::new(items, has_more_items, Some(total)))
    }

    pub(crate) fn create_folder(&mut self, parent_id: &ObjectId, properties: Properties) -> Result<ObjectId> {
        let definition = self.creatable_type(&properties, BaseTypeId::Folder)?;
        self.validate_new(&definition, &properties)?;
        let name = self.require_name(&properties)?;
        self.ensure_unique_name(parent_id, &name, None)?;

        let id = new_id();
        let stored = StoredObject {
            properties: self.stamp_new(&id, &definition, properties),
            parent: Some(parent_id.clone()),
            kind: StoredKind::Folder {
                children: Vec::new(),
            },
            change_token: 0,
        };

        self.objects.insert(id.clone(), stored);
        self.folder_children_mut(parent_id)?
            .push(Child::Folder(id.clone()));

        Ok(id)
    }

    pub(crate) fn create_document(
        &mut self,
        parent_id: &ObjectId,
        properties: Properties,
        content: Option<ContentStream>,
        state: VersioningState,
    ) -> Result<ObjectId> {
        let definition = self.creatable_type(&properties, BaseTypeId::Document)?;
        self.validate_new(&definition, &properties)?;
        let name = self.require_name(&properties)?;
        self.ensure_unique_name(parent_id, &name, None)?;

        if content.is_some() && !definition.content_stream_allowed {
            return Err(Error::invalid_argument()
                .with_message(format!("type '{}' does not allow content", definition.id)));
        }
        if !definition.versionable && state != VersioningState::None {
            return Err(Error::invalid_argument().with_message(format!(
                "type '{}' is not versionable, versioning state must be none",
                definition.id
            )));
        }

        let id = new_id();
        let series_id = Uuid::now_v7().to_string();
        let mut properties = self.stamp_new(&id, &definition, properties);
        properties.insert(ids::VERSION_SERIES_ID, PropertyValue::Id(series_id.clone()));

        let mut series = VersionSeries::default();
        match state {
            VersioningState::None | VersioningState::Major => {
                properties.insert(ids::VERSION_LABEL, "1.0");
                properties.insert(ids::IS_MAJOR_VERSION, true);
                series.versions.push(id.clone());
            }
            VersioningState::Minor => {
                properties.insert(ids::VERSION_LABEL, "0.1");
                properties.insert(ids::IS_MAJOR_VERSION, false);
                series.versions.push(id.clone());
            }
            VersioningState::CheckedOut => {
                properties.insert(ids::VERSION_LABEL, "pwc");
                properties.insert(ids::IS_MAJOR_VERSION, false);
                series.pwc = Some(id.clone());
                series.checked_out_by = Some(self.user.clone());
            }
        }

        let stored = StoredObject {
            properties,
            parent: Some(parent_id.clone()),
            kind: StoredKind::Document {
                series_id: series_id.clone(),
                content,
            },
            change_token: 0,
        };

        self.objects.insert(id.clone(), stored);
        self.series.insert(series_id.clone(), series);
        self.folder_children_mut(parent_id)?
            .push(Child::Series(series_id));

        Ok(id)
    }

    pub(crate) fn delete_object(&mut self, id: &ObjectId, all_versions: bool) -> Result<()> {
        self.ensure_not_root(id)?;

        match &self.stored(id)?.kind {
            StoredKind::Folder { children } => {
                if !children.is_empty() {
                    return Err(Error::not_empty()
                        .with_message(format!("folder '{id}' has {} children", children.len())));
                }
                self.unfile(id);
                self.objects.remove(id);
                Ok(())
            }
            StoredKind::Document { series_id, .. } => {
                let series_id = series_id.clone();
                if all_versions {
                    self.remove_series(&series_id);
                    return Ok(());
                }
                if self.is_pwc(id) {
                    return self.cancel_check_out(id);
                }

                let series = self.series_mut(&series_id)?;
                series.versions.retain(|v| v != id);
                let orphaned = series.versions.is_empty() && series.pwc.is_none();
                if orphaned {
                    self.remove_series(&series_id);
                } else {
                    self.objects.remove(id);
                }
                Ok(())
            }
        }
    }

    pub(crate) fn delete_tree(&mut self, folder_id: &ObjectId) -> Result<()> {
        self.ensure_not_root(folder_id)?;
        let children = self.folder_children(folder_id)?.to_vec();

        for child in children {
            match child {
                Child::Folder(id) => self.delete_tree(&id)?,
                Child::Series(series_id) => self.remove_series(&series_id),
            }
        }

        self.unfile(folder_id);
        self.objects.remove(folder_id);
        Ok(())
    }

    pub(crate) fn content_stream(&self, id: &ObjectId) -> Result<Option<ContentStream>> {
        match &self.stored(id)?.kind {
            StoredKind::Document { content, .. } => Ok(content.clone()),
            StoredKind::Folder { .. } => Err(Error::invalid_argument()
                .with_message(format!("object '{id}' is a folder and has no content"))),
        }
    }

    /// Applies a property diff, folding in secondary type changes.
    pub(crate) fn update_with_secondary(
        &mut self,
        id: &ObjectId,
        properties: &Properties,
        add: &[String],
        remove: &[String],
    ) -> Result<ObjectId> {
        let mut diff = properties.clone();
        if !add.is_empty() || !remove.is_empty() {
            let current = self.stored(id)?.properties.secondary_type_ids();
            let merged = merge_secondary_types(current, add, remove);
            diff.insert(ids::SECONDARY_OBJECT_TYPE_IDS, PropertyValue::id_list(merged));
        }
        self.update_properties(id, diff)
    }

    pub(crate) fn update_properties(&mut self, id: &ObjectId, diff: Properties) -> Result<ObjectId> {
        let stored = self.stored(id)?;
        let type_id = stored
            .properties
            .object_type_id()
            .unwrap_or_default()
            .to_owned();
        let definition = self.type_definition(&type_id)?;

        let secondary_ids = if diff.contains(ids::SECONDARY_OBJECT_TYPE_IDS) {
            diff.secondary_type_ids()
        } else {
            stored.properties.secondary_type_ids()
        };
        let secondary = self.secondary_types(&secondary_ids)?;

        let mode = if self.is_pwc(id) {
            WriteMode::UpdateCheckedOut
        } else {
            WriteMode::Update
        };
        diff.validate(&definition, &secondary, mode)?;

        if let Some(name) = diff.name() {
            if name.trim().is_empty() {
                return Err(Error::invalid_property().with_message("cmis:name must not be empty"));
            }
            if let Some(parent) = stored.parent.clone() {
                self.ensure_unique_name(&parent, name, Some(id))?;
            }
        }

        let user = self.user.clone();
        let stored = self.stored_mut(id)?;
        stored.properties.merge(&diff);

        // Detached secondary types take their properties with them.
        if diff.contains(ids::SECONDARY_OBJECT_TYPE_IDS) {
            let orphaned: Vec<String> = stored
                .properties
                .iter()
                .map(|(property_id, _)| property_id)
                .filter(|property_id| {
                    definition.property(property_id).is_none()
                        && secondary.iter().all(|t| t.property(property_id).is_none())
                })
                .cloned()
                .collect();
            for property_id in orphaned {
                stored.properties.remove(&property_id);
            }
        }
        stored.properties.insert(ids::LAST_MODIFIED_BY, user);
        stored
            .properties
            .insert(ids::LAST_MODIFICATION_DATE, Timestamp::now());
        stored.change_token += 1;

        Ok(id.clone())
    }

    pub(crate) fn check_out(&mut self, id: &ObjectId) -> Result<ObjectId> {
        let series_id = self.document_series(id)?;
        let definition = self.type_of(id)?;
        if !definition.versionable {
            return Err(Error::invalid_argument()
                .with_message(format!("type '{}' is not versionable", definition.id)));
        }

        let series = self.series_mut(&series_id)?;
        if let Some(pwc) = &series.pwc {
            return Err(Error::already_checked_out()
                .with_message(format!("version series is checked out as '{pwc}'")));
        }
        let latest = series.versions.last().cloned().ok_or_else(|| {
            Error::runtime().with_message(format!("version series '{series_id}' has no versions"))
        })?;

        let source = self.stored(&latest)?.clone();
        let pwc_id = new_id();

        let mut properties = source.properties.clone();
        properties.remove(ids::CHECKIN_COMMENT);
        properties.insert(ids::OBJECT_ID, PropertyValue::Id(pwc_id.to_string()));
        properties.insert(ids::VERSION_LABEL, "pwc");
        properties.insert(ids::IS_MAJOR_VERSION, false);
        properties.insert(ids::CREATED_BY, self.user.clone());
        properties.insert(ids::CREATION_DATE, Timestamp::now());

        self.objects.insert(
            pwc_id.clone(),
            StoredObject {
                properties,
                parent: source.parent,
                kind: source.kind,
                change_token: 0,
            },
        );

        let user = self.user.clone();
        let series = self.series_mut(&series_id)?;
        series.pwc = Some(pwc_id.clone());
        series.checked_out_by = Some(user);

        Ok(pwc_id)
    }

    pub(crate) fn cancel_check_out(&mut self, pwc_id: &ObjectId) -> Result<()> {
        let series_id = self.document_series(pwc_id)?;
        if !self.is_pwc(pwc_id) {
            return Err(Error::not_checked_out()
                .with_message(format!("object '{pwc_id}' is not a private working copy")));
        }

        self.objects.remove(pwc_id);
        let series = self.series_mut(&series_id)?;
        series.pwc = None;
        series.checked_out_by = None;

        if series.versions.is_empty() {
            self.remove_series(&series_id);
        }
        Ok(())
    }

    pub(crate) fn check_in(&mut self, pwc_id: &ObjectId, check_in: CheckIn) -> Result<ObjectId> {
        let series_id = self.document_series(pwc_id)?;
        if !self.is_pwc(pwc_id) {
            return Err(Error::not_checked_out()
                .with_message(format!("object '{pwc_id}' is not a private working copy")));
        }

        if let Some(diff) = &check_in.properties {
            let definition = self.type_of(pwc_id)?;
            let pwc = self.stored(pwc_id)?;
            let secondary_ids = if diff.contains(ids::SECONDARY_OBJECT_TYPE_IDS) {
                diff.secondary_type_ids()
            } else {
                pwc.properties.secondary_type_ids()
            };
            let secondary = self.secondary_types(&secondary_ids)?;
            diff.validate(&definition, &secondary, WriteMode::UpdateCheckedOut)?;
        }

        let previous_label = self
            .series
            .get(&series_id)
            .and_then(|series| series.versions.last())
            .and_then(|latest| self.objects.get(latest))
            .and_then(|latest| latest.properties.string(ids::VERSION_LABEL))
            .map(str::to_owned);
        let label = next_version_label(previous_label.as_deref(), check_in.major);

        let pwc = self.objects.remove(pwc_id).ok_or_else(|| {
            Error::not_found().with_message(format!("object '{pwc_id}' does not exist"))
        })?;

        let version_id = new_id();
        let now = Timestamp::now();
        let mut properties = pwc.properties;
        if let Some(diff) = &check_in.properties {
            properties.merge(diff);
        }
        properties.insert(ids::OBJECT_ID, PropertyValue::Id(version_id.to_string()));
        properties.insert(ids::VERSION_LABEL, label);
        properties.insert(ids::IS_MAJOR_VERSION, check_in.major);
        properties.insert(ids::CHECKIN_COMMENT, check_in.comment);
        properties.insert(ids::LAST_MODIFIED_BY, self.user.clone());
        properties.insert(ids::LAST_MODIFICATION_DATE, now);

        let kind = match pwc.kind {
            StoredKind::Document { series_id, content } => StoredKind::Document {
                series_id,
                content: check_in.content.or(content),
            },
            folder => folder,
        };

        self.objects.insert(
            version_id.clone(),
            StoredObject {
                properties,
                parent: pwc.parent,
                kind,
                change_token: 0,
            },
        );

        let series = self.series_mut(&series_id)?;
        series.pwc = None;
        series.checked_out_by = None;
        series.versions.push(version_id.clone());

        Ok(version_id)
    }

    pub(crate) fn all_versions(&self, id: &ObjectId) -> Result<Vec<ObjectData>> {
        let series_id = self.document_series(id)?;
        let series = self.series.get(&series_id).ok_or_else(|| {
            Error::not_found().with_message(format!("version series '{series_id}' does not exist"))
        })?;

        Ok(series
            .versions
            .iter()
            .rev()
            .map(|version| self.snapshot(version))
            .collect())
    }

    pub(crate) fn checked_out_documents(&self, page: PageRequest) -> Page<ObjectData> {
        let mut pwcs: Vec<&ObjectId> = self.series.values().filter_map(|s| s.pwc.as_ref()).collect();
        pwcs.sort();

        let total = pwcs.len() as u64;
        let items: Vec<ObjectData> = pwcs
            .into_iter()
            .skip(page.skip_count as usize)
            .take(page.max_items as usize)
            .map(|id| self.snapshot(id))
            .collect();

        let has_more_items = page.skip_count + (items.len() as u64) < total;
        Page::new(items, has_more_items, Some(total))
    }

    fn stored(&self, id: &ObjectId) -> Result<&StoredObject> {
        self.objects
            .get(id)
            .ok_or_else(|| Error::not_found().with_message(format!("object '{id}' does not exist")))
    }

    fn stored_mut(&mut self, id: &ObjectId) -> Result<&mut StoredObject> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| Error::not_found().with_message(format!("object '{id}' does not exist")))
    }

    fn series_mut(&mut self, series_id: &str) -> Result<&mut VersionSeries> {
        self.series.get_mut(series_id).ok_or_else(|| {
            Error::not_found().with_message(format!("version series '{series_id}' does not exist"))
        })
    }

    fn type_of(&self, id: &ObjectId) -> Result<TypeDefinition> {
        let type_id = self
            .stored(id)?
            .properties
            .object_type_id()
            .unwrap_or_default()
            .to_owned();
        self.type_definition(&type_id)
    }

    fn document_series(&self, id: &ObjectId) -> Result<String> {
        match &self.stored(id)?.kind {
            StoredKind::Document { series_id, .. } => Ok(series_id.clone()),
            StoredKind::Folder { .. } => Err(Error::invalid_argument()
                .with_message(format!("object '{id}' is not a document"))),
        }
    }

    fn is_pwc(&self, id: &ObjectId) -> bool {
        self.series.values().any(|s| s.pwc.as_ref() == Some(id))
    }

    fn folder_children(&self, folder_id: &ObjectId) -> Result<&[Child]> {
        match &self.stored(folder_id)?.kind {
            StoredKind::Folder { children } => Ok(children),
            StoredKind::Document { .. } => Err(Error::invalid_argument()
                .with_message(format!("object '{folder_id}' is not a folder"))),
        }
    }

    fn folder_children_mut(&mut self, folder_id: &ObjectId) -> Result<&mut Vec<Child>> {
        match &mut self.stored_mut(folder_id)?.kind {
            StoredKind::Folder { children } => Ok(children),
            StoredKind::Document { .. } => Err(Error::invalid_argument()
                .with_message(format!("object '{folder_id}' is not a folder"))),
        }
    }

    /// Resolves a child entry to the object a listing shows for it.
    fn child_representative(&self, child: &Child) -> Option<ObjectId> {
        match child {
            Child::Folder(id) => Some(id.clone()),
            Child::Series(series_id) => {
                let series = self.series.get(series_id)?;
                series.versions.last().or(series.pwc.as_ref()).cloned()
            }
        }
    }

    fn ensure_not_root(&self, id: &ObjectId) -> Result<()> {
        if *id == self.descriptor.root_folder_id {
            return Err(Error::invalid_argument().with_message("the root folder cannot be deleted"));
        }
        Ok(())
    }

    fn ensure_unique_name(&self, parent_id: &ObjectId, name: &str, except: Option<&ObjectId>) -> Result<()> {
        let except = except.and_then(|id| self.child_entry(id));
        let conflict = self
            .folder_children(parent_id)?
            .iter()
            .filter(|child| Some(*child) != except.as_ref())
            .filter_map(|child| self.child_representative(child))
            .filter_map(|id| self.objects.get(&id))
            .any(|sibling| sibling.properties.name() == Some(name));

        if conflict {
            return Err(Error::name_conflict()
                .with_message(format!("an object named '{name}' already exists in '{parent_id}'")));
        }
        Ok(())
    }

    fn require_name(&self, properties: &Properties) -> Result<String> {
        match properties.name() {
            Some(name) if !name.trim().is_empty() => Ok(name.to_owned()),
            _ => Err(Error::invalid_property().with_message("cmis:name must not be empty")),
        }
    }

    /// Resolves `cmis:objectTypeId` to a creatable type derived from `base`.
    fn creatable_type(&self, properties: &Properties, base: BaseTypeId) -> Result<TypeDefinition> {
        let type_id = properties.object_type_id().ok_or_else(|| {
            Error::invalid_property().with_message("cmis:objectTypeId is required")
        })?;

        let definition = self.types.get(type_id).ok_or_else(|| {
            Error::invalid_property().with_message(format!("type '{type_id}' is not registered"))
        })?;

        if definition.base_type != base || !definition.creatable {
            return Err(Error::invalid_property()
                .with_message(format!("type '{type_id}' is not a creatable {base} type")));
        }
        Ok(definition.clone())
    }

    fn validate_new(&self, definition: &TypeDefinition, properties: &Properties) -> Result<()> {
        let secondary = self.secondary_types(&properties.secondary_type_ids())?;
        properties.validate(definition, &secondary, WriteMode::Create)
    }

    fn secondary_types(&self, type_ids: &[String]) -> Result<Vec<TypeDefinition>> {
        type_ids
            .iter()
            .map(|type_id| match self.types.get(type_id) {
                Some(definition) if definition.is_secondary() => Ok(definition.clone()),
                _ => Err(Error::invalid_property()
                    .with_message(format!("'{type_id}' is not a secondary type"))),
            })
            .collect()
    }

    /// Adds the repository-maintained properties of a new object.
    fn stamp_new(&self, id: &ObjectId, definition: &TypeDefinition, mut properties: Properties) -> Properties {
        let now = Timestamp::now();
        properties.insert(ids::OBJECT_ID, PropertyValue::Id(id.to_string()));
        properties.insert(ids::BASE_TYPE_ID, PropertyValue::Id(definition.base_type.as_ref().to_owned()));
        properties.insert(ids::CREATED_BY, self.user.clone());
        properties.insert(ids::CREATION_DATE, now);
        properties.insert(ids::LAST_MODIFIED_BY, self.user.clone());
        properties.insert(ids::LAST_MODIFICATION_DATE, now);
        properties
    }

    /// Returns the child entry under which `id` is filed in its parent.
    fn child_entry(&self, id: &ObjectId) -> Option<Child> {
        match &self.objects.get(id)?.kind {
            StoredKind::Folder { .. } => Some(Child::Folder(id.clone())),
            StoredKind::Document { series_id, .. } => Some(Child::Series(series_id.clone())),
        }
    }

    fn unfile(&mut self, id: &ObjectId) {
        let Some(parent) = self.objects.get(id).and_then(|o| o.parent.clone()) else {
            return;
        };
        let Some(entry) = self.child_entry(id) else {
            return;
        };

        if let Ok(children) = self.folder_children_mut(&parent) {
            children.retain(|child| *child != entry);
        }
    }

    fn remove_series(&mut self, series_id: &str) {
        let Some(series) = self.series.remove(series_id) else {
            return;
        };

        let entry = Child::Series(series_id.to_owned());
        for object in self.objects.values_mut() {
            if let StoredKind::Folder { children } = &mut object.kind {
                children.retain(|child| *child != entry);
            }
        }

        for member in series.versions.iter().chain(series.pwc.iter()) {
            self.objects.remove(member);
        }
    }

    /// Builds the caller-visible snapshot, adding derived properties.
    fn snapshot(&self, id: &ObjectId) -> ObjectData {
        let Some(stored) = self.objects.get(id) else {
            return ObjectData::default();
        };

        let mut properties = stored.properties.clone();
        properties.insert(ids::CHANGE_TOKEN, stored.change_token.to_string());

        match &stored.kind {
            StoredKind::Folder { .. } => {
                if let Some(parent) = &stored.parent {
                    properties.insert(ids::PARENT_ID, PropertyValue::Id(parent.to_string()));
                }
                properties.insert(ids::PATH, self.path_of(id));
            }
            StoredKind::Document { series_id, content } => {
                let series = self.series.get(series_id).cloned().unwrap_or_default();
                let is_pwc = series.pwc.as_ref() == Some(id);
                let is_latest = series.versions.last() == Some(id);
                let is_major = properties.boolean(ids::IS_MAJOR_VERSION).unwrap_or(false);
                let latest_major = series
                    .versions
                    .iter()
                    .rev()
                    .find(|v| {
                        self.objects
                            .get(*v)
                            .and_then(|o| o.properties.boolean(ids::IS_MAJOR_VERSION))
                            .unwrap_or(false)
                    });

                properties.insert(ids::IS_PRIVATE_WORKING_COPY, is_pwc);
                properties.insert(ids::IS_LATEST_VERSION, is_latest);
                properties.insert(ids::IS_LATEST_MAJOR_VERSION, is_major && latest_major == Some(id));
                properties.insert(ids::IS_IMMUTABLE, !is_latest && !is_pwc);
                properties.insert(ids::IS_VERSION_SERIES_CHECKED_OUT, series.pwc.is_some());
                if let Some(pwc) = &series.pwc {
                    properties.insert(ids::VERSION_SERIES_CHECKED_OUT_ID, PropertyValue::Id(pwc.to_string()));
                }
                if let Some(user) = &series.checked_out_by {
                    properties.insert(ids::VERSION_SERIES_CHECKED_OUT_BY, user.clone());
                }

                if let Some(content) = content {
                    properties.insert(ids::CONTENT_STREAM_LENGTH, content.length() as i64);
                    properties.insert(ids::CONTENT_STREAM_MIME_TYPE, content.mime_type());
                    properties.insert(ids::CONTENT_STREAM_FILE_NAME, content.filename());
                    properties.insert(ids::CONTENT_STREAM_ID, PropertyValue::Id(format!("{id}/content")));
                }
            }
        }

        ObjectData::new(properties)
    }

    fn path_of(&self, id: &ObjectId) -> String {
        let mut segments = Vec::new();
        let mut cursor = self.objects.get(id);

        while let Some(object) = cursor {
            let Some(parent) = &object.parent else {
                break;
            };
            segments.push(object.properties.name().unwrap_or_default().to_owned());
            cursor = self.objects.get(parent);
        }

        segments.reverse();
        format!("/{}", segments.join("/"))
    }
}

fn new_id() -> ObjectId {
    ObjectId::new(Uuid::now_v7().to_string())
}

/// Computes the label of the version following `previous`.
///
/// Major check-ins bump the major number and reset the minor number; minor
/// check-ins bump the minor number.
pub(crate) fn next_version_label(previous: Option<&str>, major: bool) -> String {
    let (maj, min) = previous
        .and_then(|label| label.split_once('.'))
        .and_then(|(maj, min)| Some((maj.parse::<u32>().ok()?, min.parse::<u32>().ok()?)))
        .unwrap_or((0, 0));

    if major {
        format!("{}.0", maj + 1)
    } else {
        format!("{maj}.{}", min + 1)
    }
}
