//! `.docx` operations.
//!
//! A docx file is a zip package; the body lives in `word/document.xml`.
//! Edits rewrite that one part and copy every other entry through
//! untouched.

use std::fs::File;
use std::io::{Read, Write};
use std::ops::Range;
use std::path::Path;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use quire_types::OperationError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::atomic::replace_atomically;

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph texts joined by newlines.
pub fn read_text(path: &Path) -> Result<String, OperationError> {
    let events = parse(&read_part(path)?)?;
    let texts: Vec<String> = paragraph_spans(&events)
        .into_iter()
        .map(|span| paragraph_text(&events[span]))
        .collect::<Result<_, _>>()?;
    Ok(texts.join("\n"))
}

/// Add one paragraph at the end of the body.
pub fn append_text(path: &Path, text: &str) -> Result<String, OperationError> {
    let mut events = parse(&read_part(path)?)?;
    let at = body_end(&events)
        .ok_or_else(|| OperationError::format("document has no body"))?;

    let mut paragraph = vec![Event::Start(BytesStart::new("w:p"))];
    paragraph.push(Event::Start(BytesStart::new("w:r")));
    paragraph.extend(run_content(text));
    paragraph.push(Event::End(BytesEnd::new("w:r")));
    paragraph.push(Event::End(BytesEnd::new("w:p")));
    events.splice(at..at, paragraph);

    write_part(path, &render(events)?)?;
    Ok("Text appended successfully.".to_string())
}

/// Replace every occurrence of `old_text` in every paragraph.
///
/// A paragraph that matches is rewritten as a single run that keeps the
/// paragraph's properties and the first run's formatting. The file is left
/// alone when nothing matches.
pub fn replace_text(path: &Path, old_text: &str, new_text: &str) -> Result<String, OperationError> {
    if old_text.is_empty() {
        return Err(OperationError::validation("old_text must not be empty"));
    }
    let events = parse(&read_part(path)?)?;

    let mut out: Vec<Event<'static>> = Vec::with_capacity(events.len());
    let mut replaced = 0;
    let mut cursor = 0;
    for span in paragraph_spans(&events) {
        let text = paragraph_text(&events[span.clone()])?;
        let count = text.matches(old_text).count();
        if count == 0 {
            continue;
        }
        replaced += count;
        out.extend(events[cursor..span.start].iter().cloned());
        out.extend(rewrite_paragraph(
            &events[span.clone()],
            &text.replace(old_text, new_text),
        ));
        cursor = span.end;
    }

    if replaced > 0 {
        out.extend(events[cursor..].iter().cloned());
        write_part(path, &render(out)?)?;
    }
    Ok(format!("Replaced {replaced} occurrences."))
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> OperationError {
    OperationError::format(format!(
        "Could not open {} as a document: {err}",
        path.display()
    ))
}

fn xml_error(err: impl std::fmt::Display) -> OperationError {
    OperationError::format(format!("malformed document body: {err}"))
}

fn read_part(path: &Path) -> Result<String, OperationError> {
    if !path.exists() {
        return Err(OperationError::not_found(format!(
            "File {} not found.",
            path.display()
        )));
    }
    let mut archive = ZipArchive::new(File::open(path)?).map_err(|e| malformed(path, e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| malformed(path, e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| malformed(path, e))?;
    Ok(xml)
}

fn write_part(path: &Path, xml: &[u8]) -> Result<(), OperationError> {
    let zip_error = |e: zip::result::ZipError| OperationError::io(e.to_string());
    replace_atomically(path, |tmp| {
        let mut archive = ZipArchive::new(File::open(path)?).map_err(zip_error)?;
        let mut writer = ZipWriter::new(File::create(tmp)?);
        for idx in 0..archive.len() {
            let entry = archive.by_index_raw(idx).map_err(zip_error)?;
            if entry.name() == DOCUMENT_PART {
                let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
                writer.start_file(DOCUMENT_PART, options).map_err(zip_error)?;
                writer.write_all(xml)?;
            } else {
                writer.raw_copy_file(entry).map_err(zip_error)?;
            }
        }
        writer.finish().map_err(zip_error)?;
        Ok(())
    })
}

fn parse(xml: &str) -> Result<Vec<Event<'static>>, OperationError> {
    let mut reader = Reader::from_str(xml);
    let mut events = Vec::new();
    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Eof => break,
            event => events.push(event.into_owned()),
        }
    }
    Ok(events)
}

fn render(events: Vec<Event<'static>>) -> Result<Vec<u8>, OperationError> {
    let mut writer = Writer::new(Vec::new());
    for event in events {
        writer.write_event(event).map_err(xml_error)?;
    }
    Ok(writer.into_inner())
}

fn is(start: &BytesStart<'_>, name: &[u8]) -> bool {
    start.name().as_ref() == name
}

fn ends(end: &BytesEnd<'_>, name: &[u8]) -> bool {
    end.name().as_ref() == name
}

/// Index range of the element starting at `start`, through its end tag.
fn subtree(events: &[Event<'_>], start: usize) -> Range<usize> {
    if !matches!(events.get(start), Some(Event::Start(_))) {
        return start..start + 1;
    }
    let mut depth = 0usize;
    for (idx, event) in events.iter().enumerate().skip(start) {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return start..idx + 1;
                }
            }
            _ => {}
        }
    }
    start..events.len()
}

/// Outermost `w:p` elements, in document order.
fn paragraph_spans(events: &[Event<'_>]) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < events.len() {
        match &events[idx] {
            Event::Start(e) | Event::Empty(e) if is(e, b"w:p") => {
                let span = subtree(events, idx);
                idx = span.end;
                spans.push(span);
            }
            _ => idx += 1,
        }
    }
    spans
}

fn resolve_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Visible text of one paragraph: `w:t` content, tabs and breaks inside runs.
fn paragraph_text(events: &[Event<'_>]) -> Result<String, OperationError> {
    let mut text = String::new();
    let mut run_depth = 0usize;
    let mut in_text = false;
    for event in events {
        match event {
            Event::Start(e) if is(e, b"w:r") => run_depth += 1,
            Event::End(e) if ends(e, b"w:r") => run_depth = run_depth.saturating_sub(1),
            Event::Start(e) if run_depth > 0 && is(e, b"w:t") => in_text = true,
            Event::End(e) if ends(e, b"w:t") => in_text = false,
            Event::Empty(e) if run_depth > 0 && is(e, b"w:tab") => text.push('\t'),
            Event::Empty(e) if run_depth > 0 && (is(e, b"w:br") || is(e, b"w:cr")) => {
                text.push('\n')
            }
            Event::Text(t) if in_text => {
                let raw = t.decode().map_err(xml_error)?;
                let unescaped = quick_xml::escape::unescape(&raw).map_err(xml_error)?;
                text.push_str(&unescaped);
            }
            Event::CData(t) if in_text => {
                text.push_str(&String::from_utf8_lossy(t));
            }
            Event::GeneralRef(r) if in_text => {
                let name = r.decode().map_err(xml_error)?;
                match resolve_entity(&name) {
                    Some(c) => text.push(c),
                    None => {
                        text.push('&');
                        text.push_str(&name);
                        text.push(';');
                    }
                }
            }
            _ => {}
        }
    }
    Ok(text)
}

/// Run children for `text`: `w:t` chunks with `w:tab` and `w:br` for
/// tabs and line breaks.
fn run_content(text: &str) -> Vec<Event<'static>> {
    let mut events = Vec::new();
    let push_chunk = |events: &mut Vec<Event<'static>>, chunk: &str| {
        if chunk.is_empty() {
            return;
        }
        events.push(Event::Start(
            BytesStart::new("w:t").with_attributes([("xml:space", "preserve")]),
        ));
        events.push(Event::Text(BytesText::new(chunk).into_owned()));
        events.push(Event::End(BytesEnd::new("w:t")));
    };

    let mut chunk_start = 0;
    for (idx, c) in text.char_indices() {
        let marker = match c {
            '\t' => "w:tab",
            '\n' => "w:br",
            _ => continue,
        };
        push_chunk(&mut events, &text[chunk_start..idx]);
        events.push(Event::Empty(BytesStart::new(marker)));
        chunk_start = idx + c.len_utf8();
    }
    push_chunk(&mut events, &text[chunk_start..]);
    events
}

/// Direct child `name` of the element spanning `events`, if any.
fn child(events: &[Event<'_>], name: &[u8]) -> Option<Range<usize>> {
    let mut idx = 1;
    while idx < events.len() {
        match &events[idx] {
            Event::Start(e) | Event::Empty(e) => {
                let span = subtree(events, idx);
                if is(e, name) {
                    return Some(span);
                }
                idx = span.end;
            }
            _ => idx += 1,
        }
    }
    None
}

/// First `w:r` anywhere under the paragraph, outside its properties.
fn first_run(events: &[Event<'_>]) -> Option<Range<usize>> {
    let skip = child(events, b"w:pPr").map(|r| r.end).unwrap_or(1);
    events
        .iter()
        .enumerate()
        .skip(skip)
        .find(|(_, e)| matches!(e, Event::Start(s) if is(s, b"w:r")))
        .map(|(idx, _)| subtree(events, idx))
}

fn rewrite_paragraph(events: &[Event<'static>], text: &str) -> Vec<Event<'static>> {
    let open = match &events[0] {
        Event::Start(e) => e.clone(),
        _ => BytesStart::new("w:p"),
    };
    let mut out = vec![Event::Start(open.clone())];
    if let Some(props) = child(events, b"w:pPr") {
        out.extend(events[props].iter().cloned());
    }

    out.push(Event::Start(BytesStart::new("w:r")));
    if let Some(run) = first_run(events) {
        let run_events = &events[run];
        if let Some(props) = child(run_events, b"w:rPr") {
            out.extend(run_events[props].iter().cloned());
        }
    }
    out.extend(run_content(text));
    out.push(Event::End(BytesEnd::new("w:r")));
    out.push(Event::End(open.to_end().into_owned()));
    out
}

/// Where a new body paragraph goes: before the body's own `w:sectPr`, or
/// before `</w:body>`.
fn body_end(events: &[Event<'_>]) -> Option<usize> {
    let body = events
        .iter()
        .position(|e| matches!(e, Event::Start(s) if is(s, b"w:body")))?;
    let mut idx = body + 1;
    while idx < events.len() {
        match &events[idx] {
            Event::Start(e) | Event::Empty(e) if is(e, b"w:sectPr") => return Some(idx),
            Event::Start(_) => idx = subtree(events, idx).end,
            Event::End(e) if ends(e, b"w:body") => return Some(idx),
            _ => idx += 1,
        }
    }
    None
}
