use crate::config::{LookupMode, StoreConfig};
use crate::error::StoreResult;
use crate::models::{is_header_fields, is_header_line, Ballot, Outcome, VoteRecord, HEADER};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Append-only vote file that is also its own duplicate index.
///
/// Every submission runs its header check, duplicate lookup and append while
/// holding one lock, so two callers can never both accept the same id. Use a
/// single `VoteStore` per file per process and share it behind an `Arc`.
pub struct VoteStore {
    path: PathBuf,
    // Guards the whole read-check-append sequence. Holds the known ids in index mode.
    ids: Mutex<Option<HashSet<String>>>,
}

impl VoteStore {
    /// Opens (creating if needed) the vote file, writing or repairing its header.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        let mut file = open_prepared(&config.path)?;
        let ids = match config.lookup {
            LookupMode::Scan => None,
            LookupMode::Index => {
                let records = read_records(&mut file)?;
                let mut ids = HashSet::with_capacity(records.len());
                for record in records {
                    if !ids.insert(record.id.clone()) {
                        warn!(
                            "Vote file {} already holds more than one vote for ID {}",
                            config.path.display(),
                            record.id
                        );
                    }
                }
                Some(ids)
            }
        };

        info!(
            "Opened vote file {} ({:?} lookup)",
            config.path.display(),
            config.lookup
        );

        Ok(Self {
            path: config.path,
            ids: Mutex::new(ids),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Casts a vote for `choice`. An empty choice counts as no selection.
    pub fn submit(&self, id: &str, choice: &str) -> StoreResult<Outcome> {
        self.cast(&Ballot::new(id, Some(choice.to_string())))
    }

    /// Front-end entry point: `selected` says whether any choice was picked at all.
    pub fn submit_selection(&self, id: &str, selected: bool, label: &str) -> StoreResult<Outcome> {
        self.cast(&Ballot::new(id, selected.then(|| label.to_string())))
    }

    pub fn cast(&self, ballot: &Ballot) -> StoreResult<Outcome> {
        match ballot.to_record() {
            Some(record) => self.append_unique(record),
            None => {
                debug!("Rejected ballot with ID {:?}", ballot.id);
                Ok(Outcome::Invalid)
            }
        }
    }

    fn append_unique(&self, record: VoteRecord) -> StoreResult<Outcome> {
        let mut ids = self.ids.lock();
        let mut file = open_prepared(&self.path)?;

        let duplicate = match ids.as_ref() {
            Some(ids) => ids.contains(&record.id),
            None => scan_for_id(&mut file, &record.id)?,
        };
        if duplicate {
            info!("ID {} has already voted", record.id);
            return Ok(Outcome::Duplicate);
        }

        append_record(&mut file, &record)?;
        if let Some(ids) = ids.as_mut() {
            ids.insert(record.id.clone());
        }

        info!("Recorded vote for ID {}", record.id);
        Ok(Outcome::Accepted)
    }

    /// All stored votes in file order.
    pub fn records(&self) -> StoreResult<Vec<VoteRecord>> {
        let _guard = self.ids.lock();
        match File::open(&self.path) {
            Ok(mut file) => read_records(&mut file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn record_count(&self) -> StoreResult<usize> {
        Ok(self.records()?.len())
    }

    pub fn contains(&self, id: &str) -> StoreResult<bool> {
        let ids = self.ids.lock();
        if let Some(ids) = ids.as_ref() {
            return Ok(ids.contains(id));
        }
        match File::open(&self.path) {
            Ok(mut file) => scan_for_id(&mut file, id),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn header_line() -> String {
    format!("{}\n", HEADER.join(","))
}

fn open_rw(path: &Path) -> io::Result<File> {
    OpenOptions::new().read(true).append(true).create(true).open(path)
}

// Opens the file for read + append and makes sure the header is its first line.
fn open_prepared(path: &Path) -> StoreResult<File> {
    let mut file = open_rw(path)?;

    if file.metadata()?.len() == 0 {
        write_synced(&mut file, header_line().as_bytes(), 0)?;
        debug!("Wrote header to new vote file {}", path.display());
        return Ok(file);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut first = String::new();
    BufReader::new(&mut file).read_line(&mut first)?;
    if is_header_line(&first) {
        return Ok(file);
    }

    warn!(
        "Vote file {} does not start with the header, repairing it",
        path.display()
    );
    drop(file);
    repair_header(path)?;
    Ok(open_rw(path)?)
}

// Rewrites the file with the exact header on top via a sibling temp file and rename.
// A padded header line is replaced; any other first line stays below the header.
fn repair_header(path: &Path) -> io::Result<()> {
    let contents = fs::read(path)?;
    let first_end = contents
        .iter()
        .position(|b| *b == b'\n')
        .map_or(contents.len(), |i| i + 1);
    let body = match std::str::from_utf8(&contents[..first_end]) {
        Ok(first) if is_header_fields(first.split(',')) => &contents[first_end..],
        _ => &contents[..],
    };
    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let result = (|| {
        let mut out = File::create(&tmp)?;
        out.write_all(header_line().as_bytes())?;
        out.write_all(body)?;
        if !body.is_empty() && !body.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
        out.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn csv_reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(rdr)
}

fn scan_for_id(file: &mut File, id: &str) -> StoreResult<bool> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = csv_reader(&mut *file);
    let mut row = StringRecord::new();
    while reader.read_record(&mut row)? {
        if row.get(0) == Some(id) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn read_records(file: &mut File) -> StoreResult<Vec<VoteRecord>> {
    file.seek(SeekFrom::Start(0))?;
    let mut reader = csv_reader(&mut *file);
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if is_header_fields(row.iter()) {
            continue;
        }
        if let Some(id) = row.get(0) {
            records.push(VoteRecord::new(id, row.get(1).unwrap_or_default()));
        }
    }
    Ok(records)
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

// Builds the full row in memory and writes it in one call.
fn append_record(file: &mut File, record: &VoteRecord) -> StoreResult<()> {
    let len = file.metadata()?.len();

    let mut row = Vec::new();
    if len > 0 && !ends_with_newline(file, len)? {
        row.push(b'\n');
    }
    {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(&mut row);
        writer.serialize(record)?;
        writer.flush()?;
    }

    write_synced(file, &row, len)?;
    Ok(())
}

// Writes and syncs `bytes`; on failure truncates back to `len` so nothing partial remains.
fn write_synced(file: &mut File, bytes: &[u8], len: u64) -> io::Result<()> {
    if let Err(e) = file.write_all(bytes).and_then(|()| file.sync_data()) {
        if let Err(truncate_err) = file.set_len(len) {
            error!("Failed to roll back partial write: {}", truncate_err);
        }
        return Err(e);
    }
    Ok(())
}
