use crate::codec::dct::Dct;
use crate::codec::huffman::{extend_sign, HuffmanTable, CLASS_DC};
use crate::codec::tables::ZIGZAG_ORDER;
use crate::image::RgbImage;
use crate::utils::bitreader::BitReader;
use crate::utils::error::{JpegError, JpegResult, TableKind};
use crate::utils::marker::JpegMarker;
use log::debug;
use std::io::{self, Read};

/// A quantization table from a DQT segment, stored in natural order.
#[derive(Debug, Clone)]
pub struct QuantizationTable {
    pub id: u8,
    pub precision: u8,
    pub table: [u16; 64],
}

/// One component's parameters from the frame header, with the table
/// selectors filled in once the scan header names them.
#[derive(Debug, Clone)]
pub struct FrameComponent {
    pub id: u8,
    pub horizontal_sampling: u8,
    pub vertical_sampling: u8,
    pub quant_table_id: u8,
    pub dc_table_id: u8,
    pub ac_table_id: u8,
}

/// Entropy-coded scan data with stuffing removed. `restarts[k]` is the
/// byte offset of the data following the k-th restart marker.
#[derive(Debug, Default)]
struct ScanData {
    data: Vec<u8>,
    restarts: Vec<usize>,
}

/// Coefficient (later sample) storage for one component, laid out as a
/// grid of 8x8 blocks. The grid is MCU-aligned, so it may extend past
/// `width` x `height`; the padding blocks are decoded and then ignored.
struct ComponentPlane {
    width: u32,
    height: u32,
    blocks_wide: u32,
    data: Vec<i32>,
}

impl ComponentPlane {
    /// A hostile frame header can request absurd grids, so the backing
    /// allocation is fallible rather than aborting.
    fn new(width: u32, height: u32, blocks_wide: u32, blocks_high: u32) -> JpegResult<ComponentPlane> {
        let samples = (blocks_wide as usize)
            .checked_mul(blocks_high as usize)
            .and_then(|blocks| blocks.checked_mul(64))
            .ok_or(JpegError::AllocationFailure(usize::MAX))?;

        let mut data = Vec::new();
        data.try_reserve_exact(samples)
            .map_err(|_| JpegError::AllocationFailure(samples))?;
        data.resize(samples, 0);

        Ok(ComponentPlane {
            width,
            height,
            blocks_wide,
            data,
        })
    }

    fn block_mut(&mut self, bx: u32, by: u32) -> &mut [i32] {
        let start = (by as usize * self.blocks_wide as usize + bx as usize) * 64;
        &mut self.data[start..start + 64]
    }

    fn sample(&self, x: u32, y: u32) -> i32 {
        let start = ((y / 8) as usize * self.blocks_wide as usize + (x / 8) as usize) * 64;
        self.data[start + ((y % 8) * 8 + x % 8) as usize]
    }

    /// Nearest-neighbor lookup for a pixel of the full-resolution image.
    fn sample_scaled(&self, x: u32, y: u32, full_width: u32, full_height: u32) -> i32 {
        let sx = (x as u64 * self.width as u64 / full_width as u64) as u32;
        let sy = (y as u64 * self.height as u64 / full_height as u64) as u32;
        self.sample(sx, sy)
    }
}

/// Cursor over a marker segment body that has already been pulled into
/// memory. Running past the end means the declared segment length did
/// not match the contents, which is a marker-level error rather than an
/// I/O one.
struct SegmentReader<'a> {
    data: &'a [u8],
    pos: usize,
    name: &'static str,
}

impl<'a> SegmentReader<'a> {
    fn new(data: &'a [u8], name: &'static str) -> SegmentReader<'a> {
        SegmentReader { data, pos: 0, name }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn overrun(&self) -> JpegError {
        JpegError::MalformedMarker(format!("{} segment shorter than its contents", self.name))
    }

    fn read_u8(&mut self) -> JpegResult<u8> {
        let byte = *self.data.get(self.pos).ok_or_else(|| self.overrun())?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_u16(&mut self) -> JpegResult<u16> {
        let high = self.read_u8()? as u16;
        let low = self.read_u8()? as u16;
        Ok((high << 8) | low)
    }

    fn read_bytes(&mut self, n: usize) -> JpegResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(self.overrun());
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn expect_empty(&self) -> JpegResult<()> {
        if self.remaining() != 0 {
            return Err(JpegError::MalformedMarker(format!(
                "{} segment length does not match its contents",
                self.name
            )));
        }
        Ok(())
    }
}

fn sof_description(n: u8) -> String {
    let kind = match n {
        1 => "extended sequential DCT",
        2 => "progressive DCT",
        3 => "lossless sequential",
        5 => "differential sequential DCT",
        6 => "differential progressive DCT",
        7 => "differential lossless",
        9 => "arithmetic extended sequential DCT",
        10 => "arithmetic progressive DCT",
        11 => "arithmetic lossless",
        13 => "differential arithmetic sequential DCT",
        14 => "differential arithmetic progressive DCT",
        15 => "differential arithmetic lossless",
        _ => "reserved",
    };
    format!("SOF{} ({})", n, kind)
}

/// Baseline sequential JPEG decoder.
///
/// Walks the marker stream, collects the entropy-coded scan, then
/// reconstructs samples block by block and converts to planar RGB.
pub struct JpegDecoder<R: Read> {
    reader: BitReader<R>,
    width: u32,
    height: u32,
    precision: u8,
    components: Vec<FrameComponent>,
    quant_tables: Vec<QuantizationTable>,
    dc_tables: Vec<HuffmanTable>,
    ac_tables: Vec<HuffmanTable>,
    restart_interval: u16,
    scan: Option<ScanData>,
    dct: Dct,
}

impl<R: Read> JpegDecoder<R> {
    pub fn new(reader: R) -> JpegDecoder<R> {
        JpegDecoder {
            reader: BitReader::new(reader),
            width: 0,
            height: 0,
            precision: 0,
            components: Vec::new(),
            quant_tables: Vec::new(),
            dc_tables: Vec::new(),
            ac_tables: Vec::new(),
            restart_interval: 0,
            scan: None,
            dct: Dct::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    pub fn components(&self) -> &[FrameComponent] {
        &self.components
    }

    pub fn restart_interval(&self) -> u16 {
        self.restart_interval
    }

    /// Decodes the stream into a planar RGB image.
    pub fn decode(&mut self) -> JpegResult<RgbImage> {
        self.expect_soi()?;

        let mut pending: Option<JpegMarker> = None;
        loop {
            let marker = match pending.take() {
                Some(marker) => marker,
                None => self.next_marker()?,
            };
            debug!("Marker: {}", marker);

            match marker {
                JpegMarker::Soi => {
                    return Err(JpegError::MalformedMarker("duplicate SOI".to_string()));
                }
                JpegMarker::Eoi => {
                    if self.scan.is_none() {
                        return Err(JpegError::MalformedMarker("EOI before any scan".to_string()));
                    }
                    break;
                }
                JpegMarker::Sof(0) => self.read_frame_header()?,
                JpegMarker::Sof(n) => {
                    return Err(JpegError::UnsupportedEncoding(sof_description(n)));
                }
                JpegMarker::Dac => {
                    return Err(JpegError::UnsupportedEncoding("arithmetic coding".to_string()));
                }
                JpegMarker::Dhp | JpegMarker::Exp => {
                    return Err(JpegError::UnsupportedEncoding("hierarchical coding".to_string()));
                }
                JpegMarker::Dqt => self.read_quantization_tables()?,
                JpegMarker::Dht => self.read_huffman_tables()?,
                JpegMarker::Dri => self.read_restart_interval()?,
                JpegMarker::Sos => {
                    if self.scan.is_some() {
                        return Err(JpegError::UnsupportedEncoding("multi-scan image".to_string()));
                    }
                    self.read_scan_header()?;
                    pending = Some(self.read_entropy_data()?);
                }
                JpegMarker::Rst(_) | JpegMarker::Tem => {
                    // standalone, nothing to read
                }
                JpegMarker::Res(code) => {
                    return Err(JpegError::MalformedMarker(format!(
                        "reserved marker {:#04X}",
                        code
                    )));
                }
                other => {
                    let body = self.read_segment_body(other)?;
                    debug!("Skipping {} ({} bytes)", other, body.len());
                }
            }
        }

        self.reconstruct()
    }

    fn expect_soi(&mut self) -> JpegResult<()> {
        let mut magic = [0u8; 2];
        match self.reader.read_u8() {
            Ok(byte) => magic[0] = byte,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(JpegError::NotAJpeg);
            }
            Err(err) => return Err(err.into()),
        }
        match self.reader.read_u8() {
            Ok(byte) => magic[1] = byte,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(JpegError::NotAJpeg);
            }
            Err(err) => return Err(err.into()),
        }

        if magic != [0xFF, 0xD8] {
            return Err(JpegError::NotAJpeg);
        }
        Ok(())
    }

    /// Reads the next marker code. Fill bytes (repeated 0xFF) before the
    /// code are legal and skipped.
    fn next_marker(&mut self) -> JpegResult<JpegMarker> {
        let byte = self.reader.read_u8()?;
        if byte != 0xFF {
            return Err(JpegError::MalformedMarker(format!(
                "expected a marker, found byte {:#04X}",
                byte
            )));
        }

        let mut code = self.reader.read_u8()?;
        while code == 0xFF {
            code = self.reader.read_u8()?;
        }

        JpegMarker::from_code(code).ok_or_else(|| {
            JpegError::MalformedMarker("stuffed byte in marker position".to_string())
        })
    }

    /// Reads a segment's length field and pulls its body into memory. A
    /// length that runs past the end of the stream is a marker error, not
    /// a truncation.
    fn read_segment_body(&mut self, marker: JpegMarker) -> JpegResult<Vec<u8>> {
        let length = self.reader.read_u16()?;
        if length < 2 {
            return Err(JpegError::MalformedMarker(format!(
                "{} declares length {}, shorter than the length field itself",
                marker, length
            )));
        }

        self.reader.read_bytes(length as usize - 2).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                JpegError::MalformedMarker(format!(
                    "{} declares length {} but the stream ends first",
                    marker, length
                ))
            } else {
                err.into()
            }
        })
    }

    fn read_frame_header(&mut self) -> JpegResult<()> {
        if !self.components.is_empty() {
            return Err(JpegError::MalformedMarker("multiple frame headers".to_string()));
        }

        let body = self.read_segment_body(JpegMarker::Sof(0))?;
        let mut segment = SegmentReader::new(&body, "SOF0");

        self.precision = segment.read_u8()?;
        if self.precision != 8 {
            return Err(JpegError::UnsupportedEncoding(format!(
                "{}-bit sample precision",
                self.precision
            )));
        }

        self.height = segment.read_u16()? as u32;
        self.width = segment.read_u16()? as u32;
        if self.width == 0 || self.height == 0 {
            return Err(JpegError::MalformedMarker(format!(
                "frame dimensions {}x{}",
                self.width, self.height
            )));
        }

        let component_count = segment.read_u8()?;
        match component_count {
            1 | 3 | 4 => {}
            other => {
                return Err(JpegError::UnsupportedEncoding(format!(
                    "{}-component frame",
                    other
                )));
            }
        }

        for _ in 0..component_count {
            let id = segment.read_u8()?;
            let sampling = segment.read_u8()?;
            let horizontal_sampling = sampling >> 4;
            let vertical_sampling = sampling & 0x0F;
            let quant_table_id = segment.read_u8()?;

            if !(1..=4).contains(&horizontal_sampling) || !(1..=4).contains(&vertical_sampling) {
                return Err(JpegError::MalformedMarker(format!(
                    "component {} sampling factors {}x{}",
                    id, horizontal_sampling, vertical_sampling
                )));
            }
            if quant_table_id > 3 {
                return Err(JpegError::MalformedMarker(format!(
                    "component {} quantization table selector {}",
                    id, quant_table_id
                )));
            }

            self.components.push(FrameComponent {
                id,
                horizontal_sampling,
                vertical_sampling,
                quant_table_id,
                dc_table_id: 0,
                ac_table_id: 0,
            });
        }

        segment.expect_empty()?;
        debug!(
            "Frame: {}x{}, {} component(s)",
            self.width,
            self.height,
            self.components.len()
        );
        Ok(())
    }

    fn read_quantization_tables(&mut self) -> JpegResult<()> {
        let body = self.read_segment_body(JpegMarker::Dqt)?;
        let mut segment = SegmentReader::new(&body, "DQT");

        while segment.remaining() > 0 {
            let spec = segment.read_u8()?;
            let precision = spec >> 4;
            let id = spec & 0x0F;

            if precision > 1 {
                return Err(JpegError::MalformedMarker(format!(
                    "quantization table precision {}",
                    precision
                )));
            }
            if id > 3 {
                return Err(JpegError::MalformedMarker(format!(
                    "quantization table id {}",
                    id
                )));
            }

            let mut table = [0u16; 64];
            for k in 0..64 {
                let entry = if precision == 1 {
                    segment.read_u16()?
                } else {
                    segment.read_u8()? as u16
                };
                table[ZIGZAG_ORDER[k]] = entry;
            }

            // later definitions replace earlier ones with the same id
            let parsed = QuantizationTable { id, precision, table };
            match self.quant_tables.iter_mut().find(|t| t.id == id) {
                Some(slot) => *slot = parsed,
                None => self.quant_tables.push(parsed),
            }
        }

        Ok(())
    }

    fn read_huffman_tables(&mut self) -> JpegResult<()> {
        let body = self.read_segment_body(JpegMarker::Dht)?;
        let mut segment = SegmentReader::new(&body, "DHT");

        while segment.remaining() > 0 {
            let spec = segment.read_u8()?;
            let class = spec >> 4;
            let id = spec & 0x0F;

            if class > 1 {
                return Err(JpegError::MalformedMarker(format!(
                    "Huffman table class {}",
                    class
                )));
            }
            if id > 3 {
                return Err(JpegError::MalformedMarker(format!("Huffman table id {}", id)));
            }

            let mut counts = [0u8; 16];
            counts.copy_from_slice(segment.read_bytes(16)?);
            let total: usize = counts.iter().map(|&c| c as usize).sum();
            let symbols = segment.read_bytes(total)?.to_vec();

            let table = HuffmanTable::build(class, id, &counts, symbols)?;
            let slot_list = if class == CLASS_DC {
                &mut self.dc_tables
            } else {
                &mut self.ac_tables
            };
            match slot_list.iter_mut().find(|t| t.id == id) {
                Some(slot) => *slot = table,
                None => slot_list.push(table),
            }
        }

        Ok(())
    }

    fn read_restart_interval(&mut self) -> JpegResult<()> {
        let body = self.read_segment_body(JpegMarker::Dri)?;
        let mut segment = SegmentReader::new(&body, "DRI");
        self.restart_interval = segment.read_u16()?;
        segment.expect_empty()?;
        debug!("Restart interval: {} MCU(s)", self.restart_interval);
        Ok(())
    }

    fn read_scan_header(&mut self) -> JpegResult<()> {
        if self.components.is_empty() {
            return Err(JpegError::MalformedMarker("SOS before SOF".to_string()));
        }

        let body = self.read_segment_body(JpegMarker::Sos)?;
        let mut segment = SegmentReader::new(&body, "SOS");

        let scan_components = segment.read_u8()?;
        if scan_components as usize != self.components.len() {
            return Err(JpegError::UnsupportedEncoding(format!(
                "scan covers {} of {} components",
                scan_components,
                self.components.len()
            )));
        }

        for _ in 0..scan_components {
            let component_id = segment.read_u8()?;
            let selectors = segment.read_u8()?;
            let dc_table_id = selectors >> 4;
            let ac_table_id = selectors & 0x0F;

            let component = self
                .components
                .iter_mut()
                .find(|c| c.id == component_id)
                .ok_or_else(|| {
                    JpegError::MalformedMarker(format!(
                        "scan references unknown component {}",
                        component_id
                    ))
                })?;
            component.dc_table_id = dc_table_id;
            component.ac_table_id = ac_table_id;
        }

        let spectral_start = segment.read_u8()?;
        let spectral_end = segment.read_u8()?;
        let approximation = segment.read_u8()?;
        segment.expect_empty()?;

        if spectral_start != 0 || spectral_end != 63 || approximation != 0 {
            return Err(JpegError::UnsupportedEncoding(
                "progressive scan parameters".to_string(),
            ));
        }

        // every table the scan names must exist before entropy decode
        for component in &self.components {
            if !self.quant_tables.iter().any(|t| t.id == component.quant_table_id) {
                return Err(JpegError::MissingTable {
                    kind: TableKind::Quantization,
                    id: component.quant_table_id,
                });
            }
            if !self.dc_tables.iter().any(|t| t.id == component.dc_table_id) {
                return Err(JpegError::MissingTable {
                    kind: TableKind::HuffmanDc,
                    id: component.dc_table_id,
                });
            }
            if !self.ac_tables.iter().any(|t| t.id == component.ac_table_id) {
                return Err(JpegError::MissingTable {
                    kind: TableKind::HuffmanAc,
                    id: component.ac_table_id,
                });
            }
        }

        Ok(())
    }

    /// Collects the entropy-coded data following a scan header. Stuffed
    /// `FF 00` pairs become a literal 0xFF, restart markers record the
    /// offset of the data after them, and any other marker ends the scan
    /// and is returned to the caller.
    fn read_entropy_data(&mut self) -> JpegResult<JpegMarker> {
        let mut scan = ScanData::default();

        let mut byte = self.reader.read_u8()?;
        loop {
            if byte != 0xFF {
                scan.data.push(byte);
                byte = self.reader.read_u8()?;
                continue;
            }

            let mut code = self.reader.read_u8()?;
            while code == 0xFF {
                code = self.reader.read_u8()?;
            }

            match code {
                0x00 => {
                    scan.data.push(0xFF);
                    byte = self.reader.read_u8()?;
                }
                0xD0..=0xD7 => {
                    scan.restarts.push(scan.data.len());
                    byte = self.reader.read_u8()?;
                }
                other => {
                    let marker = JpegMarker::from_code(other).ok_or_else(|| {
                        JpegError::MalformedMarker("stuffed byte in marker position".to_string())
                    })?;
                    debug!(
                        "Scan: {} bytes, {} restart(s), ended by {}",
                        scan.data.len(),
                        scan.restarts.len(),
                        marker
                    );
                    self.scan = Some(scan);
                    return Ok(marker);
                }
            }
        }
    }

    fn reconstruct(&mut self) -> JpegResult<RgbImage> {
        let scan = self
            .scan
            .take()
            .ok_or_else(|| JpegError::MalformedMarker("no scan data".to_string()))?;

        let max_h = self
            .components
            .iter()
            .map(|c| c.horizontal_sampling as u32)
            .max()
            .unwrap_or(1);
        let max_v = self
            .components
            .iter()
            .map(|c| c.vertical_sampling as u32)
            .max()
            .unwrap_or(1);
        let mcus_x = self.width.div_ceil(8 * max_h);
        let mcus_y = self.height.div_ceil(8 * max_v);

        let mut planes = Vec::with_capacity(self.components.len());
        for c in &self.components {
            let h = c.horizontal_sampling as u32;
            let v = c.vertical_sampling as u32;
            planes.push(ComponentPlane::new(
                (self.width * h).div_ceil(max_h),
                (self.height * v).div_ceil(max_v),
                mcus_x * h,
                mcus_y * v,
            )?);
        }

        self.decode_scan(&scan, mcus_x, mcus_y, &mut planes)?;
        self.dequantize_and_idct(&mut planes)?;
        self.into_image(&planes)
    }

    fn decode_scan(
        &self,
        scan: &ScanData,
        mcus_x: u32,
        mcus_y: u32,
        planes: &mut [ComponentPlane],
    ) -> JpegResult<()> {
        let mut tables = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let dc = self
                .dc_tables
                .iter()
                .find(|t| t.id == component.dc_table_id)
                .ok_or(JpegError::MissingTable {
                    kind: TableKind::HuffmanDc,
                    id: component.dc_table_id,
                })?;
            let ac = self
                .ac_tables
                .iter()
                .find(|t| t.id == component.ac_table_id)
                .ok_or(JpegError::MissingTable {
                    kind: TableKind::HuffmanAc,
                    id: component.ac_table_id,
                })?;
            tables.push((dc, ac));
        }

        let mut reader = BitReader::new(&scan.data[..]);
        let mut previous_dc = vec![0i32; self.components.len()];
        let interval = self.restart_interval as usize;

        for mcu in 0..(mcus_x as usize * mcus_y as usize) {
            if interval > 0 && mcu > 0 && mcu % interval == 0 {
                // realign to the byte offset recorded for this boundary
                let offset = scan
                    .restarts
                    .get(mcu / interval - 1)
                    .copied()
                    .ok_or(JpegError::TruncatedStream)?;
                reader = BitReader::new(&scan.data[offset..]);
                previous_dc.fill(0);
            }

            let mcu_x = mcu as u32 % mcus_x;
            let mcu_y = mcu as u32 / mcus_x;

            for (ci, component) in self.components.iter().enumerate() {
                let (dc_table, ac_table) = tables[ci];
                for v in 0..component.vertical_sampling as u32 {
                    for h in 0..component.horizontal_sampling as u32 {
                        let bx = mcu_x * component.horizontal_sampling as u32 + h;
                        let by = mcu_y * component.vertical_sampling as u32 + v;
                        Self::decode_block(
                            &mut reader,
                            planes[ci].block_mut(bx, by),
                            dc_table,
                            ac_table,
                            &mut previous_dc[ci],
                        )?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Decodes one 8x8 block of coefficients into natural order.
    fn decode_block(
        reader: &mut BitReader<&[u8]>,
        block: &mut [i32],
        dc_table: &HuffmanTable,
        ac_table: &HuffmanTable,
        previous_dc: &mut i32,
    ) -> JpegResult<()> {
        let category = dc_table.decode_symbol(reader)?;
        if category > 11 {
            return Err(JpegError::InvalidHuffmanCode);
        }
        let diff = extend_sign(reader.read_bits(category)?, category);
        *previous_dc += diff;
        block[0] = *previous_dc;

        let mut k = 1usize;
        while k < 64 {
            let symbol = ac_table.decode_symbol(reader)?;
            if symbol == 0x00 {
                // end of block, the rest stays zero
                break;
            }
            if symbol == 0xF0 {
                // sixteen zeros; landing exactly on 64 completes the block
                k += 16;
                if k > 64 {
                    return Err(JpegError::InvalidHuffmanCode);
                }
                continue;
            }

            let run = (symbol >> 4) as usize;
            let size = symbol & 0x0F;
            k += run;
            if size == 0 || size > 10 || k >= 64 {
                return Err(JpegError::InvalidHuffmanCode);
            }

            block[ZIGZAG_ORDER[k]] = extend_sign(reader.read_bits(size)?, size);
            k += 1;
        }

        Ok(())
    }

    fn dequantize_and_idct(&self, planes: &mut [ComponentPlane]) -> JpegResult<()> {
        for (ci, plane) in planes.iter_mut().enumerate() {
            let component = &self.components[ci];
            let quant = self
                .quant_tables
                .iter()
                .find(|t| t.id == component.quant_table_id)
                .ok_or(JpegError::MissingTable {
                    kind: TableKind::Quantization,
                    id: component.quant_table_id,
                })?;

            for block in plane.data.chunks_exact_mut(64) {
                for (value, &step) in block.iter_mut().zip(quant.table.iter()) {
                    *value *= step as i32;
                }
                self.dct.inverse(block);
            }
        }
        Ok(())
    }

    /// Upsamples the component planes to full resolution and converts to
    /// planar RGB.
    fn into_image(&self, planes: &[ComponentPlane]) -> JpegResult<RgbImage> {
        let mut image = RgbImage::new(self.width, self.height)?;

        match planes {
            [gray] => {
                for y in 0..self.height {
                    for x in 0..self.width {
                        let v = gray.sample_scaled(x, y, self.width, self.height).clamp(0, 255) as u8;
                        image.write_rgb(x, y, v, v, v)?;
                    }
                }
            }
            [luma, cb_plane, cr_plane] => {
                for y in 0..self.height {
                    for x in 0..self.width {
                        let luminance = luma.sample_scaled(x, y, self.width, self.height) as f32;
                        let cb = cb_plane.sample_scaled(x, y, self.width, self.height) as f32 - 128.0;
                        let cr = cr_plane.sample_scaled(x, y, self.width, self.height) as f32 - 128.0;

                        let r = (luminance + 1.402 * cr).clamp(0.0, 255.0) as u8;
                        let g = (luminance - 0.344136 * cb - 0.714136 * cr).clamp(0.0, 255.0) as u8;
                        let b = (luminance + 1.772 * cb).clamp(0.0, 255.0) as u8;
                        image.write_rgb(x, y, r, g, b)?;
                    }
                }
            }
            [red, green, blue, _fourth] => {
                // four-component frames carry their first three channels
                // through unconverted; the fourth is dropped
                for y in 0..self.height {
                    for x in 0..self.width {
                        let r = red.sample_scaled(x, y, self.width, self.height).clamp(0, 255) as u8;
                        let g = green.sample_scaled(x, y, self.width, self.height).clamp(0, 255) as u8;
                        let b = blue.sample_scaled(x, y, self.width, self.height).clamp(0, 255) as u8;
                        image.write_rgb(x, y, r, g, b)?;
                    }
                }
            }
            other => {
                return Err(JpegError::UnsupportedEncoding(format!(
                    "{}-component frame",
                    other.len()
                )));
            }
        }

        Ok(image)
    }
}
