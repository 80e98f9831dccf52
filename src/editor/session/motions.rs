//! Motion targets and the ranges operators act on.

use crate::editor::commands::motion::{
    column_position, current_word_end, find_char, paragraph_backward, paragraph_forward,
    position_for_column, word_backward, word_end, word_forward, MotionKind,
};
use crate::editor::commands::parser::{Motion, Operator};
use crate::editor::error::{EditorError, EditorResult};
use crate::editor::events::{AddressRange, Direction, Mode};
use crate::editor::models::MarkName;
use crate::editor::services::{find_matching_bracket, SearchHit, SearchScope};
use crate::editor::session::{EditorSession, FindSpec};

const BRACKETS: &[u8] = b"()[]{}";

impl EditorSession {
    /// Where `motion` repeated `count` times takes the cursor
    ///
    /// With `for_operator` a rightward motion may reach the end of the line
    /// so the operator covers the last character.
    pub(crate) fn motion_target(
        &mut self,
        motion: Motion,
        count: Option<usize>,
        for_operator: bool,
    ) -> EditorResult<usize> {
        let n = count.unwrap_or(1).max(1);
        let dot = self.buffer.dot();
        let buffer = &self.buffer;

        let target = match motion {
            Motion::Left => {
                let start = buffer.line_start(dot);
                if dot == start {
                    return Err(EditorError::Bell);
                }
                dot - n.min(dot - start)
            }
            Motion::Right => {
                let limit = if for_operator {
                    buffer.line_end(dot)
                } else {
                    buffer.line_last_char(dot)
                };
                if dot >= limit {
                    return Err(EditorError::Bell);
                }
                dot.saturating_add(n).min(limit)
            }
            Motion::Up | Motion::Down => {
                let direction = if motion == Motion::Up {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                let line = self.lines_away(dot, n, direction)?;
                let column = self.renderer.display_column(buffer, dot, Mode::Insert);
                position_for_column(buffer, line, column, self.options.tabstop)
            }
            Motion::LineStart => buffer.line_start(dot),
            Motion::LineEnd => {
                let line = self.lines_away(dot, n - 1, Direction::Forward)?;
                buffer.line_last_char(line)
            }
            Motion::FirstNonBlank => buffer.first_non_blank(dot),
            Motion::NextLine => buffer.first_non_blank(self.lines_away(dot, n, Direction::Forward)?),
            Motion::PrevLine => buffer.first_non_blank(self.lines_away(dot, n, Direction::Backward)?),
            Motion::Column => column_position(buffer, dot, n),
            Motion::WordForward { big } => repeat_until_still(dot, n, |p| word_forward(buffer, p, big)),
            Motion::WordBackward { big } => repeat_until_still(dot, n, |p| word_backward(buffer, p, big)),
            Motion::WordEnd { big } => repeat_until_still(dot, n, |p| word_end(buffer, p, big)),
            Motion::FindChar { byte, forward, till } => {
                self.last_find = Some(FindSpec {
                    byte,
                    forward,
                    till,
                });
                find_char(buffer, dot, byte, forward, till, n).ok_or(EditorError::Bell)?
            }
            Motion::RepeatFind { reverse } => {
                let last = self.last_find.ok_or(EditorError::Bell)?;
                let forward = last.forward != reverse;
                find_char(buffer, dot, last.byte, forward, last.till, n).ok_or(EditorError::Bell)?
            }
            Motion::GotoLine => {
                let line = count.unwrap_or_else(|| buffer.total_lines());
                buffer.first_non_blank(buffer.find_line(line))
            }
            Motion::ScreenTop | Motion::ScreenMiddle | Motion::ScreenBottom => {
                self.renderer.sync_cursor(buffer, dot, self.mode);
                let row = match motion {
                    Motion::ScreenTop => n - 1,
                    Motion::ScreenMiddle => (self.renderer.lines_on_screen(buffer) - 1) / 2,
                    _ => {
                        let shown = self.renderer.lines_on_screen(buffer);
                        shown.saturating_sub(n)
                    }
                };
                buffer.first_non_blank(self.renderer.row_position(buffer, row))
            }
            Motion::MatchBracket => {
                let end = buffer.line_end(dot);
                let text = buffer.as_bytes();
                let bracket = (dot..end)
                    .find(|&p| BRACKETS.contains(&text[p]))
                    .ok_or(EditorError::Bell)?;
                find_matching_bracket(buffer, bracket).ok_or(EditorError::Bell)?
            }
            Motion::ParagraphForward => {
                let mut p = dot;
                for _ in 0..n {
                    p = paragraph_forward(buffer, p).ok_or(EditorError::Bell)?;
                }
                p
            }
            Motion::ParagraphBackward => {
                let mut p = dot;
                for _ in 0..n {
                    p = paragraph_backward(buffer, p).ok_or(EditorError::Bell)?;
                }
                p
            }
            Motion::MarkLine(mark) => {
                let pos = self.mark_position(mark)?;
                self.buffer.first_non_blank(pos)
            }
            Motion::MarkExact(mark) => self.mark_position(mark)?,
            Motion::SearchNext { reverse } => {
                let direction = if reverse {
                    self.last_search_direction.reversed()
                } else {
                    self.last_search_direction
                };
                let pattern = self.last_search.clone().ok_or(EditorError::NoPreviousPattern)?;
                // Searches wrap, so the hits repeat once the first comes round again.
                let mut hits: Vec<usize> = Vec::new();
                let mut p = dot;
                for _ in 0..n {
                    p = self.search_from(p, &pattern, direction)?;
                    if hits.first() == Some(&p) {
                        p = hits[(n - 1) % hits.len()];
                        break;
                    }
                    hits.push(p);
                }
                p
            }
        };
        Ok(target.min(self.buffer.len().saturating_sub(1)))
    }

    /// Start of the line `n` lines from the one containing `pos`
    fn lines_away(&self, pos: usize, n: usize, direction: Direction) -> EditorResult<usize> {
        let mut line = self.buffer.line_start(pos);
        for step in 0..n {
            let next = match direction {
                Direction::Forward => self.buffer.next_line(line),
                Direction::Backward => self.buffer.prev_line(line),
            };
            match next {
                Some(next) => line = next,
                None if step == 0 => return Err(EditorError::Bell),
                None => break,
            }
        }
        Ok(line)
    }

    /// `'x`/`` `x ``; `''` swaps with the previous context
    fn mark_position(&mut self, mark: u8) -> EditorResult<usize> {
        if mark == b'\'' {
            return self
                .registers
                .swap_context(&self.buffer, self.buffer.dot())
                .ok_or(EditorError::MarkNotSet);
        }
        let name = MarkName::from_key(mark).ok_or(EditorError::MarkNotSet)?;
        self.registers
            .get_mark(name, &self.buffer)
            .ok_or(EditorError::MarkNotSet)
    }

    /// Search for `pattern` starting next to `from`, reporting wraparound
    pub(crate) fn search_from(
        &mut self,
        from: usize,
        pattern: &str,
        direction: Direction,
    ) -> EditorResult<usize> {
        let len = self.buffer.len();
        let start = match direction {
            Direction::Forward => (from + 1).min(len),
            Direction::Backward if from == 0 => len,
            Direction::Backward => from - 1,
        };
        let hit = self
            .search
            .find(&self.buffer, start, pattern, direction, SearchScope::Full)?
            .ok_or_else(|| EditorError::PatternNotFound(pattern.to_string()))?;

        // Searching backward from the first byte starts at the far end.
        let hit = SearchHit {
            wrapped: hit.wrapped || (direction == Direction::Backward && from == 0),
            ..hit
        };
        if let Some(message) = hit.wrap_message(direction) {
            self.status.set_message(message);
        }
        Ok(hit.position)
    }

    /// The range an operator covers for `motion`; `None` when it is empty
    pub(crate) fn motion_range(
        &mut self,
        operator: Operator,
        motion: Motion,
        count: Option<usize>,
    ) -> EditorResult<Option<AddressRange>> {
        let dot = self.buffer.dot();
        match motion.kind() {
            MotionKind::Linewise => {
                let target = self.motion_target(motion, count, true)?;
                Ok(Some(self.line_range(dot, target)))
            }
            MotionKind::Word => self.word_range(operator, motion, count),
            MotionKind::Charwise => {
                let target = self.motion_target(motion, count, true)?;
                let inclusive = motion.is_inclusive();
                let (lo, hi) = if target > dot {
                    (dot, if inclusive { target } else { target - 1 })
                } else if target < dot {
                    (target, dot - 1)
                } else if inclusive {
                    (dot, dot)
                } else {
                    return Ok(None);
                };
                Ok(self.within_line(lo, hi, dot))
            }
        }
    }

    /// Ranges that start and end on the cursor line never take its newline
    fn within_line(&self, lo: usize, hi: usize, dot: usize) -> Option<AddressRange> {
        let line_end = self.buffer.line_end(dot);
        let same_line = self.buffer.line_start(lo) == self.buffer.line_start(dot)
            && self.buffer.line_start(hi) == self.buffer.line_start(dot);
        let hi = if same_line && hi >= line_end {
            line_end.checked_sub(1)?
        } else {
            hi
        };
        (hi >= lo).then(|| AddressRange::new(lo, hi, false))
    }

    fn word_range(
        &mut self,
        operator: Operator,
        motion: Motion,
        count: Option<usize>,
    ) -> EditorResult<Option<AddressRange>> {
        let dot = self.buffer.dot();
        let n = count.unwrap_or(1).max(1);
        let on_blank = matches!(self.buffer.byte_at(dot), Some(b' ' | b'\t' | b'\n'));

        match motion {
            // `cw` on a word changes to the end of that word
            Motion::WordForward { big } if operator == Operator::Change && !on_blank => {
                let buffer = &self.buffer;
                let first = current_word_end(buffer, dot, big);
                let target = repeat_until_still(first, n - 1, |p| word_end(buffer, p, big));
                Ok(Some(AddressRange::new(dot, target, false)))
            }
            Motion::WordForward { .. } => {
                let line_end = self.buffer.line_end(dot);
                if line_end == dot {
                    // An empty line: the word is the line itself
                    if self.buffer.next_line(dot).is_none() {
                        return Err(EditorError::Bell);
                    }
                    return Ok(Some(AddressRange::new(dot, dot, false)));
                }
                let target = self.motion_target(motion, count, true)?;
                let last = self.buffer.len() - 1;
                let hi = if target > line_end {
                    line_end - 1
                } else if target == last && self.buffer.byte_at(last) != Some(b'\n') {
                    target
                } else if target > dot {
                    target - 1
                } else {
                    return Err(EditorError::Bell);
                };
                Ok(Some(AddressRange::new(dot, hi, false)))
            }
            Motion::WordBackward { .. } => {
                let target = self.motion_target(motion, count, true)?;
                if target >= dot {
                    return Err(EditorError::Bell);
                }
                Ok(Some(AddressRange::new(target, dot - 1, false)))
            }
            _ => {
                let target = self.motion_target(motion, count, true)?;
                Ok(Some(AddressRange::new(dot, target, false)))
            }
        }
    }
}

/// Apply `step` up to `n` times, stopping once it no longer moves
fn repeat_until_still(start: usize, n: usize, step: impl Fn(usize) -> usize) -> usize {
    let mut p = start;
    for _ in 0..n {
        let next = step(p);
        if next == p {
            break;
        }
        p = next;
    }
    p
}
