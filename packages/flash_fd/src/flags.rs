/// How a file should be opened, expressed as a set of independent flags.
///
/// The default value has every flag cleared, which no engine accepts (a file
/// must be opened for at least reading or writing), so callers either start
/// from one of the presets or build the set explicitly:
///
/// ```
/// use flash_fd::OpenFlags;
///
/// let flags = OpenFlags::new().write(true).create(true);
///
/// assert!(flags.is_write());
/// assert!(flags.is_create());
/// assert!(!flags.is_read());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct OpenFlags {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
}

impl OpenFlags {
    /// Creates a flag set with every flag cleared.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
        }
    }

    /// Opens an existing file for reading only.
    #[must_use]
    pub const fn read_only() -> Self {
        Self::new().read(true)
    }

    /// Creates the file if missing, discards any existing content and opens
    /// it for writing.
    #[must_use]
    pub const fn create_truncate() -> Self {
        Self::new().write(true).create(true).truncate(true)
    }

    /// Creates the file if missing and opens it for writing at the end of
    /// the existing content.
    #[must_use]
    pub const fn create_append() -> Self {
        Self::new().write(true).create(true).append(true)
    }

    /// Returns a copy with the read flag set as given.
    #[must_use]
    pub const fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Returns a copy with the write flag set as given.
    #[must_use]
    pub const fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Returns a copy with the append flag set as given. When appending,
    /// every write lands at the current end of the file regardless of the
    /// cursor position.
    #[must_use]
    pub const fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    /// Returns a copy with the truncate flag set as given. Truncation
    /// discards any existing content at open time.
    #[must_use]
    pub const fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Returns a copy with the create flag set as given. Creation applies
    /// only when the file does not exist yet.
    #[must_use]
    pub const fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Returns a copy with the create-new flag set as given. When set, the
    /// open fails if the file already exists.
    #[must_use]
    pub const fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    /// Whether the file is opened for reading.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.read
    }

    /// Whether the file is opened for writing.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        self.write
    }

    /// Whether writes land at the end of the file.
    #[must_use]
    pub const fn is_append(&self) -> bool {
        self.append
    }

    /// Whether existing content is discarded at open time.
    #[must_use]
    pub const fn is_truncate(&self) -> bool {
        self.truncate
    }

    /// Whether a missing file is created.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        self.create
    }

    /// Whether an existing file makes the open fail.
    #[must_use]
    pub const fn is_create_new(&self) -> bool {
        self.create_new
    }
}
