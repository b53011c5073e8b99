//! EPUB container reading: ZIP archive, OPF package, NCX table of contents.
//!
//! This is plumbing around the classification core: it produces the ordered
//! [`Document`] sequence and book metadata, and makes no keep/drop decisions
//! itself.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::book::{Document, Ebook, Metadata, TocEntry};
use crate::error::{Error, Result};
use crate::util::{decode_text, extract_xml_encoding};

/// Parsed OPF content
struct OpfData {
    metadata: Metadata,
    /// Maps manifest id -> (href, media_type)
    manifest: HashMap<String, (String, String)>,
    /// Spine entries as (idref, linear)
    spine: Vec<(String, bool)>,
    ncx_href: Option<String>,
}

/// Read an EPUB file from disk.
///
/// Supports EPUB 2 and EPUB 3. Extracts metadata, the NCX table of
/// contents, and every spine content document in reading order.
///
/// # Example
///
/// ```no_run
/// use epubsift::read_epub;
///
/// let ebook = read_epub("path/to/book.epub")?;
/// println!("Title: {}", ebook.metadata.title);
/// println!("Documents: {}", ebook.documents.len());
/// # Ok::<(), epubsift::Error>(())
/// ```
pub fn read_epub<P: AsRef<Path>>(path: P) -> Result<Ebook> {
    let file = std::fs::File::open(path)?;
    read_epub_from_reader(file)
}

/// Read an EPUB from any [`Read`] + [`Seek`] source.
///
/// Useful for reading from memory buffers or network streams.
pub fn read_epub_from_reader<R: Read + Seek>(reader: R) -> Result<Ebook> {
    let mut archive = ZipArchive::new(reader)?;

    // 1. Find the OPF file path from container.xml
    let opf_path = find_opf_path(&mut archive)?;
    let opf_dir = Path::new(&opf_path)
        .parent()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_default();

    // 2. Parse the OPF file
    let opf_content = read_archive_file(&mut archive, &opf_path)?;
    let OpfData {
        metadata,
        manifest,
        spine,
        ncx_href,
    } = parse_opf(&opf_content)?;

    // 3. Load spine content documents in reading order. order_index is the
    // spine position, so it stays stable even when non-document or missing
    // entries are skipped.
    let mut documents = Vec::new();
    for (idx, (idref, linear)) in spine.iter().enumerate() {
        let Some((href, media_type)) = manifest.get(idref) else {
            log::warn!("spine idref '{idref}' missing from manifest");
            continue;
        };
        if !is_content_document(media_type) {
            continue;
        }

        let full_path = resolve_path(&opf_dir, href);
        match read_archive_file_bytes(&mut archive, &full_path) {
            Ok(bytes) => {
                let hint = extract_xml_encoding(&bytes).map(|s| s.to_string());
                let markup = decode_text(&bytes, hint.as_deref()).into_owned();
                let mut document = Document::new(idx, href.clone(), markup);
                document.is_linear = *linear;
                documents.push(document);
            }
            Err(e) => {
                log::warn!("cannot read spine document {full_path}: {e}");
            }
        }
    }

    // 4. Parse NCX for table of contents (if present)
    let mut toc = Vec::new();
    if let Some(ncx_href) = ncx_href {
        let ncx_path = resolve_path(&opf_dir, &ncx_href);
        if let Ok(ncx_content) = read_archive_file(&mut archive, &ncx_path) {
            toc = parse_ncx(&ncx_content)?;
        }
    }

    Ok(Ebook {
        metadata,
        toc,
        documents,
    })
}

fn is_content_document(media_type: &str) -> bool {
    media_type == "application/xhtml+xml" || media_type == "text/html"
}

fn find_opf_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<String> {
    let container = read_archive_file(archive, "META-INF/container.xml")?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(String::from_utf8(attr.value.to_vec())?);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "No rootfile found in container.xml".into(),
    ))
}

fn parse_opf(content: &str) -> Result<OpfData> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut metadata = Metadata::default();
    let mut manifest: HashMap<String, (String, String)> = HashMap::new();
    let mut spine: Vec<(String, bool)> = Vec::new();
    let mut ncx_href: Option<String> = None;
    let mut toc_id: Option<String> = None;

    let mut in_metadata = false;
    let mut current_element: Option<String> = None;
    let mut buf_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local_name = local_name(name.as_ref());

                match local_name {
                    b"metadata" => in_metadata = true,
                    b"title" | b"creator" | b"language" | b"identifier" | b"publisher"
                    | b"description" | b"date" => {
                        if in_metadata {
                            current_element = Some(String::from_utf8_lossy(local_name).to_string());
                            buf_text.clear();
                        }
                    }
                    b"spine" => {
                        // Get toc attribute for NCX reference
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"toc" {
                                toc_id = Some(String::from_utf8(attr.value.to_vec())?);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local_name = local_name(name.as_ref());

                match local_name {
                    b"item" => {
                        let mut id = String::new();
                        let mut href = String::new();
                        let mut media_type = String::new();

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"id" => id = String::from_utf8(attr.value.to_vec())?,
                                b"href" => href = String::from_utf8(attr.value.to_vec())?,
                                b"media-type" => {
                                    media_type = String::from_utf8(attr.value.to_vec())?
                                }
                                _ => {}
                            }
                        }

                        if !id.is_empty() {
                            manifest.insert(id, (href, media_type));
                        }
                    }
                    b"itemref" => {
                        let mut idref = String::new();
                        let mut linear = true;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"idref" => idref = String::from_utf8(attr.value.to_vec())?,
                                b"linear" => linear = attr.value.as_ref() != b"no",
                                _ => {}
                            }
                        }

                        if !idref.is_empty() {
                            spine.push((idref, linear));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if current_element.is_some() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    buf_text.push_str(&raw);
                }
            }
            Ok(Event::GeneralRef(e)) => {
                // Handle entity references like &apos; &lt; etc
                if current_element.is_some() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = match entity.as_ref() {
                        "apos" => "'",
                        "quot" => "\"",
                        "lt" => "<",
                        "gt" => ">",
                        "amp" => "&",
                        _ => "",
                    };
                    buf_text.push_str(resolved);
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local_name = local_name(name.as_ref());

                if local_name == b"metadata" {
                    in_metadata = false;
                }

                if let Some(ref elem) = current_element {
                    match elem.as_str() {
                        "title" => metadata.title = buf_text.clone(),
                        "creator" => metadata.authors.push(buf_text.clone()),
                        "language" => metadata.language = buf_text.clone(),
                        "identifier" => {
                            if metadata.identifier.is_empty() {
                                metadata.identifier = buf_text.clone();
                            }
                        }
                        "publisher" => metadata.publisher = Some(buf_text.clone()),
                        "description" => metadata.description = Some(buf_text.clone()),
                        "date" => metadata.date = Some(buf_text.clone()),
                        _ => {}
                    }
                    current_element = None;
                    buf_text.clear();
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    // Resolve NCX href from toc_id
    if let Some(toc_id) = toc_id
        && let Some((href, _)) = manifest.get(&toc_id)
    {
        ncx_href = Some(href.clone());
    }

    Ok(OpfData {
        metadata,
        manifest,
        spine,
        ncx_href,
    })
}

fn parse_ncx(content: &str) -> Result<Vec<TocEntry>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    // State for each navPoint level, saved/restored when entering/exiting
    // nested navPoints
    struct NavPointState {
        children: Vec<TocEntry>,
        text: Option<String>,
        src: Option<String>,
        play_order: Option<usize>,
    }

    let mut stack: Vec<NavPointState> = vec![NavPointState {
        children: Vec::new(),
        text: None,
        src: None,
        play_order: None,
    }];
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"navPoint" => {
                        let mut play_order = None;
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"playOrder"
                                && let Ok(order_str) = String::from_utf8(attr.value.to_vec())
                            {
                                play_order = order_str.parse().ok();
                            }
                        }
                        stack.push(NavPointState {
                            children: Vec::new(),
                            text: None,
                            src: None,
                            play_order,
                        });
                    }
                    b"text" => in_text = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if local == b"content" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"src"
                            && let Some(state) = stack.last_mut()
                        {
                            state.src = Some(String::from_utf8(attr.value.to_vec())?);
                        }
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    match &mut state.text {
                        Some(existing) => existing.push_str(&raw),
                        None => state.text = Some(raw.into_owned()),
                    }
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_text && let Some(state) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    let resolved = match entity.as_ref() {
                        "apos" => "'",
                        "quot" => "\"",
                        "lt" => "<",
                        "gt" => ">",
                        "amp" => "&",
                        _ => "",
                    };
                    match &mut state.text {
                        Some(existing) => existing.push_str(resolved),
                        None => state.text = Some(resolved.to_string()),
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                match local {
                    b"text" => in_text = false,
                    b"navPoint" => {
                        if let Some(state) = stack.pop()
                            && let (Some(text), Some(src)) = (state.text, state.src)
                        {
                            let mut entry = TocEntry::new(text, src);
                            entry.children = state.children;
                            entry.play_order = state.play_order;

                            if let Some(parent) = stack.last_mut() {
                                parent.children.push(entry);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(stack.pop().map(|s| s.children).unwrap_or_default())
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let bytes = read_archive_file_bytes(archive, path)?;
    // Strip UTF-8 BOM if present
    let bytes = strip_bom(&bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn read_archive_file_bytes<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
) -> Result<Vec<u8>> {
    // Try direct lookup first
    match archive.by_name(path) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            return Ok(contents);
        }
        Err(zip::result::ZipError::FileNotFound) => {}
        Err(e) => return Err(e.into()),
    }

    // Fallback: try percent-decoded path (handles malformed EPUBs)
    let decoded = percent_encoding::percent_decode_str(path)
        .decode_utf8()
        .map_err(|_| Error::InvalidEpub(format!("Invalid UTF-8 in path: {}", path)))?;

    let mut file = archive.by_name(&decoded)?;
    let mut contents = Vec::new();
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Strip UTF-8 BOM (byte order mark) if present
fn strip_bom(data: &[u8]) -> &[u8] {
    // UTF-8 BOM: EF BB BF
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}

fn resolve_path(base: &str, href: &str) -> String {
    if base.is_empty() {
        href.to_string()
    } else {
        format!("{}/{}", base, href)
    }
}

/// Extract local name from potentially namespaced XML name
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name(b"dc:title"), b"title");
        assert_eq!(local_name(b"title"), b"title");
        assert_eq!(local_name(b"opf:meta"), b"meta");
    }

    #[test]
    fn test_is_content_document() {
        assert!(is_content_document("application/xhtml+xml"));
        assert!(is_content_document("text/html"));
        assert!(!is_content_document("text/css"));
        assert!(!is_content_document("image/jpeg"));
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("OEBPS", "ch1.xhtml"), "OEBPS/ch1.xhtml");
        assert_eq!(resolve_path("", "ch1.xhtml"), "ch1.xhtml");
    }

    #[test]
    fn test_parse_opf_spine_linear() {
        let opf = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Example</dc:title>
    <dc:creator>Author One</dc:creator>
    <dc:language>en</dc:language>
  </metadata>
  <manifest>
    <item id="c1" href="c1.xhtml" media-type="application/xhtml+xml"/>
    <item id="c2" href="c2.xhtml" media-type="application/xhtml+xml"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="c1"/>
    <itemref idref="c2" linear="no"/>
  </spine>
</package>"#;

        let opf_data = parse_opf(opf).unwrap();
        assert_eq!(opf_data.metadata.title, "Example");
        assert_eq!(opf_data.metadata.authors, vec!["Author One"]);
        assert_eq!(
            opf_data.spine,
            vec![("c1".to_string(), true), ("c2".to_string(), false)]
        );
        assert_eq!(opf_data.ncx_href.as_deref(), Some("toc.ncx"));
    }

    #[test]
    fn test_parse_ncx_nested() {
        let ncx = r#"<?xml version="1.0"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <navMap>
    <navPoint id="n1" playOrder="1">
      <navLabel><text>Part One</text></navLabel>
      <content src="c1.xhtml"/>
      <navPoint id="n2" playOrder="2">
        <navLabel><text>Chapter 1</text></navLabel>
        <content src="c1.xhtml#ch1"/>
      </navPoint>
    </navPoint>
  </navMap>
</ncx>"#;

        let toc = parse_ncx(ncx).unwrap();
        assert_eq!(toc.len(), 1);
        assert_eq!(toc[0].title, "Part One");
        assert_eq!(toc[0].play_order, Some(1));
        assert_eq!(toc[0].children.len(), 1);
        assert_eq!(toc[0].children[0].title, "Chapter 1");
    }
}
