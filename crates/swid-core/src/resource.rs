// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resource trees carried by [`Evidence`] and [`Payload`].
//!
//! A [`ResourceCollection`] owns directories, files, processes, generic resources
//! and firmware descriptors. Directories nest; everything else is a leaf. Directory
//! nodes are de-duplicated by path through an index owned by the collection, so
//! inserting `lib/a.jar` and `lib/b.jar` yields one `lib` holding two files.

use std::collections::HashMap;
use std::io::Read;

use time::{OffsetDateTime, UtcOffset};
use tracing::trace;

use crate::digest::HashAlgorithm;
use crate::error::TagError;
use crate::path::relativize;
use crate::vocab::{check_term, Bindings};

/// Normalizes a timestamp to whole seconds in UTC.
///
/// Every wire format carries second precision only.
pub(crate) fn normalize_timestamp(ts: OffsetDateTime) -> OffsetDateTime {
    let utc = ts.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0).unwrap_or(utc)
}

fn require_text(field: impl Into<String>, value: &str) -> Result<(), TagError> {
    if value.is_empty() {
        return Err(TagError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// A file inside a resource collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct File {
    name: String,
    size: Option<u64>,
    version: Option<String>,
    root: Option<String>,
    location: Option<String>,
    hashes: Vec<(HashAlgorithm, Vec<u8>)>,
}

impl File {
    /// Creates a file node.
    pub fn new(name: impl Into<String>) -> Result<Self, TagError> {
        let name = name.into();
        require_text("file.name", &name)?;
        Ok(Self {
            name,
            size: None,
            version: None,
            root: None,
            location: None,
            hashes: Vec::new(),
        })
    }

    /// File name (last path segment).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Sets the size in bytes.
    pub fn set_size(&mut self, size: u64) -> &mut Self {
        self.size = Some(size);
        self
    }

    /// File version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Sets the file version.
    pub fn set_version(&mut self, version: impl Into<String>) -> Result<&mut Self, TagError> {
        let version = version.into();
        require_text("file.version", &version)?;
        self.version = Some(version);
        Ok(self)
    }

    /// Filesystem root the file lives under (e.g. `%programfiles%`).
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Sets the filesystem root.
    pub fn set_root(&mut self, root: impl Into<String>) -> Result<&mut Self, TagError> {
        let root = root.into();
        require_text("file.root", &root)?;
        self.root = Some(root);
        Ok(self)
    }

    /// Install location hint.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Sets the install location hint.
    pub fn set_location(&mut self, location: impl Into<String>) -> Result<&mut Self, TagError> {
        let location = location.into();
        require_text("file.location", &location)?;
        self.location = Some(location);
        Ok(self)
    }

    /// Digests recorded for this file, in insertion order.
    pub fn hashes(&self) -> &[(HashAlgorithm, Vec<u8>)] {
        &self.hashes
    }

    /// Digest recorded under `algorithm`.
    pub fn hash(&self, algorithm: &HashAlgorithm) -> Option<&[u8]> {
        self.hashes
            .iter()
            .find(|(alg, _)| alg == algorithm)
            .map(|(_, digest)| digest.as_slice())
    }

    /// Records a precomputed digest, replacing any earlier one for the same algorithm.
    pub fn set_hash(&mut self, algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<&mut Self, TagError> {
        check_term(&format!("file.hash[{algorithm}]"), &algorithm)?;
        if digest.is_empty() {
            return Err(TagError::validation(
                format!("file.hash[{algorithm}]"),
                "digest must not be empty",
            ));
        }
        match self.hashes.iter_mut().find(|(alg, _)| *alg == algorithm) {
            Some(slot) => slot.1 = digest,
            None => self.hashes.push((algorithm, digest)),
        }
        Ok(self)
    }

    /// Digests `source` with `algorithm` and records the result.
    pub fn compute_hash<R: Read>(&mut self, algorithm: HashAlgorithm, source: R) -> Result<&mut Self, TagError> {
        let digest = algorithm.digest(source)?;
        self.set_hash(algorithm, digest)
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        require_text(format!("{at}.name"), &self.name)?;
        for (alg, digest) in &self.hashes {
            if alg.name().is_empty() {
                return Err(TagError::validation(format!("{at}.hash"), "algorithm must be named"));
            }
            if digest.is_empty() {
                return Err(TagError::validation(
                    format!("{at}.hash[{alg}]"),
                    "digest must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// A directory node. Child directory names are unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Directory {
    name: String,
    root: Option<String>,
    location: Option<String>,
    directories: Vec<Directory>,
    files: Vec<File>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new(name: impl Into<String>) -> Result<Self, TagError> {
        let name = name.into();
        require_text("directory.name", &name)?;
        Ok(Self {
            name,
            root: None,
            location: None,
            directories: Vec::new(),
            files: Vec::new(),
        })
    }

    /// Directory name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem root.
    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    /// Sets the filesystem root.
    pub fn set_root(&mut self, root: impl Into<String>) -> Result<&mut Self, TagError> {
        let root = root.into();
        require_text("directory.root", &root)?;
        self.root = Some(root);
        Ok(self)
    }

    /// Install location hint.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Sets the install location hint.
    pub fn set_location(&mut self, location: impl Into<String>) -> Result<&mut Self, TagError> {
        let location = location.into();
        require_text("directory.location", &location)?;
        self.location = Some(location);
        Ok(self)
    }

    /// Child directories.
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Files directly inside this directory.
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Attaches a child directory; names must be unique.
    pub fn add_directory(&mut self, child: Directory) -> Result<&mut Self, TagError> {
        if self.directories.iter().any(|d| d.name == child.name) {
            return Err(TagError::validation(
                format!("directory[{}].directory", self.name),
                format!("duplicate directory `{}`", child.name),
            ));
        }
        self.directories.push(child);
        Ok(self)
    }

    /// Attaches a file.
    pub fn add_file(&mut self, file: File) -> &mut Self {
        self.files.push(file);
        self
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        require_text(format!("{at}.name"), &self.name)?;
        for (i, dir) in self.directories.iter().enumerate() {
            let child = format!("{at}.directory[{i}]");
            if self.directories[..i].iter().any(|d| d.name == dir.name) {
                return Err(TagError::validation(
                    format!("{child}.name"),
                    format!("duplicate directory `{}`", dir.name),
                ));
            }
            dir.validate(&child)?;
        }
        for (i, file) in self.files.iter().enumerate() {
            file.validate(&format!("{at}.file[{i}]"))?;
        }
        Ok(())
    }

    fn hash_algorithms<'a>(&'a self, out: &mut Vec<&'a HashAlgorithm>) {
        for dir in &self.directories {
            dir.hash_algorithms(out);
        }
        out.extend(self.files.iter().flat_map(|f| f.hashes.iter().map(|(alg, _)| alg)));
    }
}

/// A running process observed as evidence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Process {
    name: String,
    pid: Option<u64>,
}

impl Process {
    /// Creates a process item.
    pub fn new(name: impl Into<String>) -> Result<Self, TagError> {
        let name = name.into();
        require_text("process.name", &name)?;
        Ok(Self { name, pid: None })
    }

    /// Process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Process id.
    pub fn pid(&self) -> Option<u64> {
        self.pid
    }

    /// Sets the process id.
    pub fn set_pid(&mut self, pid: u64) -> &mut Self {
        self.pid = Some(pid);
        self
    }
}

/// A resource of a caller-defined type (e.g. a registry key).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceItem {
    kind: String,
}

impl ResourceItem {
    /// Creates a resource item of the given type.
    pub fn new(kind: impl Into<String>) -> Result<Self, TagError> {
        let kind = kind.into();
        require_text("resource.type", &kind)?;
        Ok(Self { kind })
    }

    /// Resource type.
    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// One payload image inside a firmware descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirmwarePayload {
    format_type: u64,
    size: u64,
    digests: Vec<(HashAlgorithm, Vec<u8>)>,
    storage_id: Option<String>,
    package: Option<Vec<u8>>,
}

impl FirmwarePayload {
    /// Creates a payload record.
    pub fn new(format_type: u64, size: u64) -> Self {
        Self {
            format_type,
            size,
            digests: Vec::new(),
            storage_id: None,
            package: None,
        }
    }

    /// Image format type.
    pub fn format_type(&self) -> u64 {
        self.format_type
    }

    /// Image size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Image digests, in insertion order.
    pub fn digests(&self) -> &[(HashAlgorithm, Vec<u8>)] {
        &self.digests
    }

    /// Records a digest of the image, replacing any earlier one for the same algorithm.
    pub fn add_digest(&mut self, algorithm: HashAlgorithm, digest: Vec<u8>) -> Result<&mut Self, TagError> {
        check_term(&format!("firmware-payload.hash[{algorithm}]"), &algorithm)?;
        if digest.is_empty() {
            return Err(TagError::validation(
                format!("firmware-payload.hash[{algorithm}]"),
                "digest must not be empty",
            ));
        }
        match self.digests.iter_mut().find(|(alg, _)| *alg == algorithm) {
            Some(slot) => slot.1 = digest,
            None => self.digests.push((algorithm, digest)),
        }
        Ok(self)
    }

    /// Storage identifier on the target device.
    pub fn storage_id(&self) -> Option<&str> {
        self.storage_id.as_deref()
    }

    /// Sets the storage identifier.
    pub fn set_storage_id(&mut self, storage_id: impl Into<String>) -> Result<&mut Self, TagError> {
        let storage_id = storage_id.into();
        require_text("firmware-payload.storage-id", &storage_id)?;
        self.storage_id = Some(storage_id);
        Ok(self)
    }

    /// Packaged image bytes, written as an opaque blob.
    pub fn package(&self) -> Option<&[u8]> {
        self.package.as_deref()
    }

    /// Attaches the packaged image bytes.
    pub fn set_package(&mut self, package: Vec<u8>) -> &mut Self {
        self.package = Some(package);
        self
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        for (alg, digest) in &self.digests {
            if digest.is_empty() {
                return Err(TagError::validation(
                    format!("{at}.hash[{alg}]"),
                    "digest must not be empty",
                ));
            }
        }
        if let Some(id) = &self.storage_id {
            require_text(format!("{at}.storage-id"), id)?;
        }
        Ok(())
    }
}

/// A firmware manifest descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Firmware {
    manifest_id: String,
    creation_timestamp: OffsetDateTime,
    version: u64,
    nonce: Option<Vec<u8>>,
    target_device_id: Option<String>,
    payloads: Vec<FirmwarePayload>,
}

impl Firmware {
    /// Creates a firmware descriptor. The timestamp is kept at second precision in UTC.
    pub fn new(
        manifest_id: impl Into<String>,
        creation_timestamp: OffsetDateTime,
        version: u64,
    ) -> Result<Self, TagError> {
        let manifest_id = manifest_id.into();
        require_text("firmware.manifest-id", &manifest_id)?;
        Ok(Self {
            manifest_id,
            creation_timestamp: normalize_timestamp(creation_timestamp),
            version,
            nonce: None,
            target_device_id: None,
            payloads: Vec::new(),
        })
    }

    /// Manifest identifier.
    pub fn manifest_id(&self) -> &str {
        &self.manifest_id
    }

    /// When the manifest was created.
    pub fn creation_timestamp(&self) -> OffsetDateTime {
        self.creation_timestamp
    }

    /// Manifest sequence number.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Anti-replay nonce.
    pub fn nonce(&self) -> Option<&[u8]> {
        self.nonce.as_deref()
    }

    /// Sets the nonce.
    pub fn set_nonce(&mut self, nonce: Vec<u8>) -> Result<&mut Self, TagError> {
        if nonce.is_empty() {
            return Err(TagError::validation("firmware.nonce", "must not be empty"));
        }
        self.nonce = Some(nonce);
        Ok(self)
    }

    /// Identifier of the device the firmware targets.
    pub fn target_device_id(&self) -> Option<&str> {
        self.target_device_id.as_deref()
    }

    /// Sets the target device identifier.
    pub fn set_target_device_id(&mut self, id: impl Into<String>) -> Result<&mut Self, TagError> {
        let id = id.into();
        require_text("firmware.target-device-id", &id)?;
        self.target_device_id = Some(id);
        Ok(self)
    }

    /// Payload images.
    pub fn payloads(&self) -> &[FirmwarePayload] {
        &self.payloads
    }

    /// Appends a payload image.
    pub fn add_payload(&mut self, payload: FirmwarePayload) -> &mut Self {
        self.payloads.push(payload);
        self
    }

    fn validate(&self, at: &str) -> Result<(), TagError> {
        require_text(format!("{at}.manifest-id"), &self.manifest_id)?;
        for (i, payload) in self.payloads.iter().enumerate() {
            payload.validate(&format!("{at}.firmware-payload[{i}]"))?;
        }
        Ok(())
    }
}

/// Resources shared by [`Evidence`] and [`Payload`].
#[derive(Clone, Debug, Default)]
pub struct ResourceCollection {
    directories: Vec<Directory>,
    files: Vec<File>,
    processes: Vec<Process>,
    resources: Vec<ResourceItem>,
    firmware: Vec<Firmware>,
    /// Directory path -> child positions from the collection root.
    index: HashMap<Vec<String>, Vec<usize>>,
}

impl PartialEq for ResourceCollection {
    fn eq(&self, other: &Self) -> bool {
        self.directories == other.directories
            && self.files == other.files
            && self.processes == other.processes
            && self.resources == other.resources
            && self.firmware == other.firmware
    }
}

impl Eq for ResourceCollection {}

impl ResourceCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the collection holds no resources.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty()
            && self.files.is_empty()
            && self.processes.is_empty()
            && self.resources.is_empty()
            && self.firmware.is_empty()
    }

    /// Top-level directories.
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    /// Top-level files.
    pub fn files(&self) -> &[File] {
        &self.files
    }

    /// Process items.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Generic resource items.
    pub fn resources(&self) -> &[ResourceItem] {
        &self.resources
    }

    /// Firmware descriptors.
    pub fn firmware(&self) -> &[Firmware] {
        &self.firmware
    }

    /// Looks up the directory at `path` (segments from the collection root).
    pub fn directory<S: AsRef<str>>(&self, path: &[S]) -> Option<&Directory> {
        let key: Vec<String> = path.iter().map(|s| s.as_ref().to_owned()).collect();
        let chain = self.index.get(&key)?;
        let (&first, rest) = chain.split_first()?;
        let mut dir = self.directories.get(first)?;
        for &i in rest {
            dir = dir.directories.get(i)?;
        }
        Some(dir)
    }

    /// Inserts a file at `path`, creating missing directories along the way.
    ///
    /// All but the last segment name directories; directories already present are
    /// reused. A file with the same name in the same directory is returned as is.
    pub fn insert_file<S: AsRef<str>>(&mut self, path: &[S]) -> Result<&mut File, TagError> {
        let Some((name, parents)) = path.split_last() else {
            return Err(TagError::validation("file.path", "must have at least one segment"));
        };
        let name = name.as_ref();
        let chain = self.ensure_directories(parents)?;
        let files = match chain.split_first() {
            Some((&first, rest)) => &mut self.directory_at_mut(first, rest).files,
            None => &mut self.files,
        };
        let position = match files.iter().position(|f| f.name == name) {
            Some(position) => position,
            None => {
                files.push(File::new(name)?);
                files.len() - 1
            }
        };
        Ok(&mut files[position])
    }

    /// Inserts the file at `target`, stored relative to a tag archived at `tag_path`.
    ///
    /// `..` segments become directories named `..`.
    pub fn add_relative_file(&mut self, tag_path: &str, target: &str) -> Result<&mut File, TagError> {
        let path = relativize(tag_path, target);
        if matches!(path.last().map(String::as_str), None | Some("..")) {
            return Err(TagError::validation(
                "file.path",
                format!("`{target}` does not name a file relative to `{tag_path}`"),
            ));
        }
        self.insert_file(path.as_slice())
    }

    /// Attaches a prebuilt top-level directory tree; names must be unique.
    pub fn add_directory(&mut self, directory: Directory) -> Result<&mut Self, TagError> {
        if self.directories.iter().any(|d| d.name == directory.name) {
            return Err(TagError::validation(
                "directory.name",
                format!("duplicate directory `{}`", directory.name),
            ));
        }
        let mut key = Vec::new();
        let mut chain = vec![self.directories.len()];
        index_tree(&directory, &mut key, &mut chain, &mut self.index);
        self.directories.push(directory);
        Ok(self)
    }

    /// Attaches a top-level file.
    pub fn add_file(&mut self, file: File) -> &mut Self {
        self.files.push(file);
        self
    }

    /// Attaches a process item.
    pub fn add_process(&mut self, process: Process) -> &mut Self {
        self.processes.push(process);
        self
    }

    /// Attaches a generic resource item.
    pub fn add_resource(&mut self, resource: ResourceItem) -> &mut Self {
        self.resources.push(resource);
        self
    }

    /// Attaches a firmware descriptor.
    pub fn add_firmware(&mut self, firmware: Firmware) -> &mut Self {
        self.firmware.push(firmware);
        self
    }

    /// Validates every resource; `at` prefixes reported field paths.
    pub fn validate(&self, at: &str) -> Result<(), TagError> {
        for (i, dir) in self.directories.iter().enumerate() {
            let child = format!("{at}.directory[{i}]");
            if self.directories[..i].iter().any(|d| d.name == dir.name) {
                return Err(TagError::validation(
                    format!("{child}.name"),
                    format!("duplicate directory `{}`", dir.name),
                ));
            }
            dir.validate(&child)?;
        }
        for (i, file) in self.files.iter().enumerate() {
            file.validate(&format!("{at}.file[{i}]"))?;
        }
        for (i, process) in self.processes.iter().enumerate() {
            require_text(format!("{at}.process[{i}].name"), &process.name)?;
        }
        for (i, resource) in self.resources.iter().enumerate() {
            require_text(format!("{at}.resource[{i}].type"), &resource.kind)?;
        }
        for (i, firmware) in self.firmware.iter().enumerate() {
            firmware.validate(&format!("{at}.firmware[{i}]"))?;
        }

        // One index per algorithm name across the whole collection.
        let mut algorithms = Vec::new();
        for dir in &self.directories {
            dir.hash_algorithms(&mut algorithms);
        }
        algorithms.extend(self.files.iter().flat_map(|f| f.hashes.iter().map(|(alg, _)| alg)));
        algorithms.extend(
            self.firmware
                .iter()
                .flat_map(|fw| &fw.payloads)
                .flat_map(|p| p.digests.iter().map(|(alg, _)| alg)),
        );
        let mut bindings = Bindings::new();
        for algorithm in algorithms {
            bindings.bind(algorithm).map_err(|err| {
                TagError::validation(format!("{at}.hash[{algorithm}]"), err.to_string())
            })?;
        }
        Ok(())
    }

    fn ensure_directories<S: AsRef<str>>(&mut self, path: &[S]) -> Result<Vec<usize>, TagError> {
        let mut key: Vec<String> = Vec::with_capacity(path.len());
        let mut chain: Vec<usize> = Vec::with_capacity(path.len());
        for segment in path {
            let segment = segment.as_ref();
            key.push(segment.to_owned());
            if let Some(found) = self.index.get(&key) {
                chain.clone_from(found);
                continue;
            }
            let dir = Directory::new(segment)?;
            let siblings = match chain.split_first() {
                Some((&first, rest)) => &mut self.directory_at_mut(first, rest).directories,
                None => &mut self.directories,
            };
            siblings.push(dir);
            chain.push(siblings.len() - 1);
            trace!(path = %key.join("/"), "created directory");
            self.index.insert(key.clone(), chain.clone());
        }
        Ok(chain)
    }

    fn directory_at_mut(&mut self, first: usize, rest: &[usize]) -> &mut Directory {
        rest.iter()
            .fold(&mut self.directories[first], |dir, &i| &mut dir.directories[i])
    }
}

fn index_tree(
    dir: &Directory,
    key: &mut Vec<String>,
    chain: &mut Vec<usize>,
    index: &mut HashMap<Vec<String>, Vec<usize>>,
) {
    key.push(dir.name.clone());
    index.insert(key.clone(), chain.clone());
    for (i, child) in dir.directories.iter().enumerate() {
        chain.push(i);
        index_tree(child, key, chain, index);
        chain.pop();
    }
    key.pop();
}

/// Resources observed on a device, with when and where they were collected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evidence {
    collection: ResourceCollection,
    date: Option<OffsetDateTime>,
    device_id: Option<String>,
}

impl Evidence {
    /// Creates empty evidence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Observed resources.
    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Observed resources, mutably.
    pub fn collection_mut(&mut self) -> &mut ResourceCollection {
        &mut self.collection
    }

    /// Collection time.
    pub fn date(&self) -> Option<OffsetDateTime> {
        self.date
    }

    /// Sets the collection time (kept at second precision in UTC).
    pub fn set_date(&mut self, date: OffsetDateTime) -> &mut Self {
        self.date = Some(normalize_timestamp(date));
        self
    }

    /// Identifier of the device the evidence came from.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// Sets the device identifier.
    pub fn set_device_id(&mut self, id: impl Into<String>) -> Result<&mut Self, TagError> {
        let id = id.into();
        require_text("evidence.device-id", &id)?;
        self.device_id = Some(id);
        Ok(self)
    }

    pub(crate) fn validate(&self) -> Result<(), TagError> {
        if let Some(id) = &self.device_id {
            require_text("evidence.device-id", id)?;
        }
        self.collection.validate("evidence")
    }
}

/// Resources installed by the tagged software.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    collection: ResourceCollection,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installed resources.
    pub fn collection(&self) -> &ResourceCollection {
        &self.collection
    }

    /// Installed resources, mutably.
    pub fn collection_mut(&mut self) -> &mut ResourceCollection {
        &mut self.collection
    }

    pub(crate) fn validate(&self) -> Result<(), TagError> {
        self.collection.validate("payload")
    }
}
