//! # Board Module
//!
//! The fixed-size grid of cells, their occupancy and the protected-cell mechanic.

use crate::{EntityId, Position, RuleResult, RuleViolation, Tag};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Marker rendered for a guarded, unoccupied cell.
pub const PROTECTED_MARKER: &str = "#";

/// Marker rendered for a free cell.
pub const FREE_MARKER: &str = "*";

/// Broad category of the entity standing in a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupantKind {
    Character,
    Enemy,
    Chest,
}

/// Non-owning reference from a cell to the entity standing in it.
///
/// The entity itself lives in the session's entity registry; the cell only keeps its
/// id together with the immutable tag and kind needed for rendering and routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub id: EntityId,
    pub tag: Tag,
    pub kind: OccupantKind,
}

/// One grid location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    position: Position,
    occupant: Option<Occupant>,
    protected: bool,
    protectors: Vec<EntityId>,
}

impl Cell {
    /// Creates an empty, unguarded cell.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            occupant: None,
            protected: false,
            protectors: Vec::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// True when nobody stands here and no enemy guards the cell.
    pub fn is_free(&self) -> bool {
        !self.protected && self.occupant.is_none()
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn is_protected(&self) -> bool {
        self.protected
    }

    pub fn occupant(&self) -> Option<&Occupant> {
        self.occupant.as_ref()
    }

    /// Replaces the occupant; `None` vacates the cell.
    pub fn set_occupant(&mut self, occupant: Option<Occupant>) {
        self.occupant = occupant;
    }

    /// Guarding enemies in the order they were added.
    pub fn protectors(&self) -> &[EntityId] {
        &self.protectors
    }

    /// Adds a guarding enemy. Adding the same enemy twice is a no-op.
    pub fn add_protector(&mut self, enemy: EntityId) {
        if !self.protectors.contains(&enemy) {
            self.protectors.push(enemy);
        }
        self.protected = true;
    }

    /// Removes a guarding enemy, dropping the protection once nobody guards the cell.
    pub fn remove_protector(&mut self, enemy: EntityId) {
        self.protectors.retain(|&id| id != enemy);
        if self.protectors.is_empty() {
            self.protected = false;
        }
    }

    /// Tag of the occupant, `#` when guarded, `*` when free.
    pub fn occupation_tag(&self) -> &str {
        match &self.occupant {
            Some(occupant) => &occupant.tag,
            None if self.protected => PROTECTED_MARKER,
            None => FREE_MARKER,
        }
    }
}

/// Fixed-size matrix of cells with 1-based coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    width: i32,
    length: i32,
    /// Row-major, row `y - 1` holds cells `(1..=width, y)`
    cells: Vec<Cell>,
}

impl Board {
    /// Creates a board of free cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use console_dungeon::{Board, Position};
    ///
    /// let board = Board::new(8, 8);
    /// assert!(board.cell_at(Position::new(8, 8)).is_ok());
    /// assert!(board.cell_at(Position::new(9, 1)).is_err());
    /// ```
    pub fn new(width: i32, length: i32) -> Self {
        let mut cells = Vec::with_capacity((width.max(0) * length.max(0)) as usize);
        for y in 1..=length {
            for x in 1..=width {
                cells.push(Cell::new(Position::new(x, y)));
            }
        }

        Self {
            width,
            length,
            cells,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn length(&self) -> i32 {
        self.length
    }

    /// Checks whether a position lies on the board.
    pub fn contains(&self, position: Position) -> bool {
        (1..=self.width).contains(&position.x) && (1..=self.length).contains(&position.y)
    }

    /// Fails with `OutOfBounds` unless the position lies on the board.
    pub fn ensure_contains(&self, position: Position) -> RuleResult<()> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(RuleViolation::OutOfBounds(format!(
                "The coordinates {} are outside the game board.",
                position
            )))
        }
    }

    fn index(&self, position: Position) -> usize {
        ((position.y - 1) * self.width + (position.x - 1)) as usize
    }

    pub fn cell_at(&self, position: Position) -> RuleResult<&Cell> {
        self.ensure_contains(position)?;
        Ok(&self.cells[self.index(position)])
    }

    pub fn cell_at_mut(&mut self, position: Position) -> RuleResult<&mut Cell> {
        self.ensure_contains(position)?;
        let index = self.index(position);
        Ok(&mut self.cells[index])
    }

    /// Iterates over all cells, row by row from `y = 1`.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Renders the board as ASCII, highest row first, column indices underneath.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for y in (1..=self.length).rev() {
            let _ = write!(out, "{:>2} |", y);
            for x in 1..=self.width {
                let cell = &self.cells[self.index(Position::new(x, y))];
                let _ = write!(out, "{:>3}", cell.occupation_tag());
            }
            out.push('\n');
        }

        let _ = writeln!(out, "   +{}", "-".repeat((self.width.max(0) * 3) as usize));
        out.push_str("    ");
        for x in 1..=self.width {
            let _ = write!(out, "{:>3}", x);
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occupant(id: u32, tag: &str, kind: OccupantKind) -> Option<Occupant> {
        Some(Occupant {
            id: EntityId(id),
            tag: tag.to_string(),
            kind,
        })
    }

    #[test]
    fn test_cell_free_and_occupied() {
        let mut cell = Cell::new(Position::new(1, 1));
        assert!(cell.is_free());
        assert_eq!(cell.occupation_tag(), "*");

        cell.set_occupant(occupant(1, "w", OccupantKind::Character));
        assert!(cell.is_occupied());
        assert!(!cell.is_free());
        assert_eq!(cell.occupation_tag(), "w");

        cell.set_occupant(None);
        assert!(cell.is_free());
    }

    #[test]
    fn test_cell_protection_follows_protectors() {
        let mut cell = Cell::new(Position::new(3, 3));
        cell.add_protector(EntityId(1));
        cell.add_protector(EntityId(2));
        cell.add_protector(EntityId(2));
        assert_eq!(cell.protectors(), &[EntityId(1), EntityId(2)]);
        assert!(cell.is_protected());
        assert_eq!(cell.occupation_tag(), "#");

        cell.remove_protector(EntityId(1));
        assert!(cell.is_protected());

        cell.remove_protector(EntityId(2));
        assert!(!cell.is_protected());
        assert!(cell.is_free());
    }

    #[test]
    fn test_occupant_tag_wins_over_protection() {
        let mut cell = Cell::new(Position::new(3, 8));
        cell.add_protector(EntityId(4));
        cell.set_occupant(occupant(9, "t", OccupantKind::Chest));
        assert_eq!(cell.occupation_tag(), "t");
    }

    #[test]
    fn test_board_bounds() {
        let board = Board::new(8, 8);
        assert_eq!(board.width(), 8);
        assert_eq!(board.length(), 8);
        assert!(board.contains(Position::new(1, 1)));
        assert!(board.contains(Position::new(8, 8)));
        for bad in [(0, 1), (1, 0), (9, 1), (1, 9), (-3, 4)] {
            let pos = Position::new(bad.0, bad.1);
            assert!(matches!(
                board.cell_at(pos),
                Err(RuleViolation::OutOfBounds(_))
            ));
        }
    }

    #[test]
    fn test_cell_coordinates_match_lookup() {
        let board = Board::new(8, 8);
        for cell in board.cells() {
            assert_eq!(board.cell_at(cell.position()).unwrap(), cell);
        }
    }

    #[test]
    fn test_render_layout() {
        let mut board = Board::new(3, 2);
        board
            .cell_at_mut(Position::new(1, 1))
            .unwrap()
            .set_occupant(occupant(1, "w", OccupantKind::Character));
        board
            .cell_at_mut(Position::new(3, 2))
            .unwrap()
            .add_protector(EntityId(2));

        let rendered = board.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], " 2 |  *  *  #");
        assert_eq!(lines[1], " 1 |  w  *  *");
        assert_eq!(lines[2], "   +---------");
        assert_eq!(lines[3], "      1  2  3");
    }
}
