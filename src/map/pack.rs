//! Sibling circle packing and smallest enclosing circle.
//!
//! Packing walks a front chain of already placed circles: each new circle is
//! placed tangent to the current pair `(a, b)`, and if it intersects anything
//! on the chain the chain is cut back and the placement retried. After every
//! insertion the pair closest to the origin becomes the next anchor pair,
//! which keeps the pack compact and roughly round.

use eframe::egui::{Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

const ENCLOSE_SHUFFLE_SEED: u64 = 0x7a1e_47a9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug)]
struct Disc {
    x: f64,
    y: f64,
    r: f64,
}

impl Disc {
    fn from_circle(circle: Circle) -> Self {
        Self {
            x: f64::from(circle.center.x),
            y: f64::from(circle.center.y),
            r: f64::from(circle.radius.max(0.0)),
        }
    }

    fn to_circle(self) -> Circle {
        Circle {
            center: vec2(self.x as f32, self.y as f32),
            radius: self.r as f32,
        }
    }
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: Disc, a: Disc, c: &mut Disc) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let d2 = dx * dx + dy * dy;

    if d2 > 0.0 {
        let a2 = (a.r + c.r) * (a.r + c.r);
        let b2 = (b.r + c.r) * (b.r + c.r);
        if a2 > b2 {
            let x = (d2 + b2 - a2) / (2.0 * d2);
            let y = (b2 / d2 - x * x).max(0.0).sqrt();
            c.x = b.x - x * dx - y * dy;
            c.y = b.y - x * dy + y * dx;
        } else {
            let x = (d2 + a2 - b2) / (2.0 * d2);
            let y = (a2 / d2 - x * x).max(0.0).sqrt();
            c.x = a.x + x * dx - y * dy;
            c.y = a.y + x * dy + y * dx;
        }
    } else {
        c.x = a.x + c.r;
        c.y = a.y;
    }
}

fn intersects(a: Disc, b: Disc) -> bool {
    let dr = a.r + b.r - 1e-6;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn pair_score(a: Disc, b: Disc) -> f64 {
    let ab = a.r + b.r;
    if ab <= 0.0 {
        return a.x * a.x + a.y * a.y;
    }
    let dx = (a.x * b.r + b.x * a.r) / ab;
    let dy = (a.y * b.r + b.y * a.r) / ab;
    dx * dx + dy * dy
}

/// Packs circles of the given radii without overlap and returns their centers,
/// translated so the enclosing circle of the pack sits on the origin.
pub fn pack_siblings(radii: &[f32]) -> Vec<Vec2> {
    let mut discs = radii
        .iter()
        .map(|radius| Disc {
            x: 0.0,
            y: 0.0,
            r: f64::from(radius.max(0.0)),
        })
        .collect::<Vec<_>>();
    let n = discs.len();

    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![Vec2::ZERO];
    }

    discs[0].x = -discs[1].r;
    discs[1].x = discs[0].r;
    if n == 2 {
        return discs.iter().map(|disc| vec2(disc.x as f32, disc.y as f32)).collect();
    }

    let (first, second) = (discs[0], discs[1]);
    place(second, first, &mut discs[2]);

    let mut next = vec![0usize; n];
    let mut previous = vec![0usize; n];
    next[0] = 1;
    previous[2] = 1;
    next[1] = 2;
    previous[0] = 2;
    next[2] = 0;
    previous[1] = 0;

    let mut a = 0usize;
    let mut b = 1usize;
    let mut index = 3usize;

    'pack: while index < n {
        let c = index;
        let (anchor_a, anchor_b) = (discs[a], discs[b]);
        place(anchor_a, anchor_b, &mut discs[c]);

        let mut j = next[b];
        let mut k = previous[a];
        let mut sj = discs[b].r;
        let mut sk = discs[a].r;

        loop {
            if sj <= sk {
                if intersects(discs[j], discs[c]) {
                    b = j;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sj += discs[j].r;
                j = next[j];
            } else {
                if intersects(discs[k], discs[c]) {
                    a = k;
                    next[a] = b;
                    previous[b] = a;
                    continue 'pack;
                }
                sk += discs[k].r;
                k = previous[k];
            }

            if j == next[k] {
                break;
            }
        }

        previous[c] = a;
        next[c] = b;
        next[a] = c;
        previous[b] = c;
        b = c;

        let mut best = a;
        let mut best_score = pair_score(discs[a], discs[next[a]]);
        let mut cursor = next[c];
        while cursor != b {
            let score = pair_score(discs[cursor], discs[next[cursor]]);
            if score < best_score {
                best = cursor;
                best_score = score;
            }
            cursor = next[cursor];
        }
        a = best;
        b = next[a];
        index += 1;
    }

    let mut chain = vec![discs[b]];
    let mut cursor = next[b];
    while cursor != b {
        chain.push(discs[cursor]);
        cursor = next[cursor];
    }

    let offset = enclose_discs(&chain).unwrap_or_else(|| bounding_disc(&chain));
    discs
        .iter()
        .map(|disc| vec2((disc.x - offset.x) as f32, (disc.y - offset.y) as f32))
        .collect()
}

/// Smallest circle enclosing every input circle, or `None` for empty input.
pub fn enclosing_circle(circles: &[Circle]) -> Option<Circle> {
    if circles.is_empty() {
        return None;
    }

    let discs = circles.iter().copied().map(Disc::from_circle).collect::<Vec<_>>();
    let disc = enclose_discs(&discs).unwrap_or_else(|| bounding_disc(&discs));
    Some(disc.to_circle())
}

fn bounding_disc(discs: &[Disc]) -> Disc {
    let count = discs.len().max(1) as f64;
    let cx = discs.iter().map(|disc| disc.x).sum::<f64>() / count;
    let cy = discs.iter().map(|disc| disc.y).sum::<f64>() / count;
    let r = discs
        .iter()
        .map(|disc| ((disc.x - cx).powi(2) + (disc.y - cy).powi(2)).sqrt() + disc.r)
        .fold(0.0, f64::max);
    Disc { x: cx, y: cy, r }
}

fn enclose_discs(discs: &[Disc]) -> Option<Disc> {
    let mut shuffled = discs.to_vec();
    shuffled.shuffle(&mut StdRng::seed_from_u64(ENCLOSE_SHUFFLE_SEED));

    let mut basis: Vec<Disc> = Vec::new();
    let mut enclosing: Option<Disc> = None;
    let mut index = 0usize;

    while index < shuffled.len() {
        let candidate = shuffled[index];
        if enclosing.is_some_and(|disc| encloses_weak(disc, candidate)) {
            index += 1;
            continue;
        }

        basis = extend_basis(&basis, candidate)?;
        enclosing = Some(enclose_basis(&basis)?);
        index = 0;
    }

    enclosing
}

fn extend_basis(basis: &[Disc], p: Disc) -> Option<Vec<Disc>> {
    if encloses_weak_all(p, basis) {
        return Some(vec![p]);
    }

    for &member in basis {
        if encloses_not(p, member) && encloses_weak_all(enclose_basis2(member, p), basis) {
            return Some(vec![member, p]);
        }
    }

    for i in 0..basis.len().saturating_sub(1) {
        for j in (i + 1)..basis.len() {
            let (bi, bj) = (basis[i], basis[j]);
            if encloses_not(enclose_basis2(bi, bj), p)
                && encloses_not(enclose_basis2(bi, p), bj)
                && encloses_not(enclose_basis2(bj, p), bi)
                && encloses_weak_all(enclose_basis3(bi, bj, p), basis)
            {
                return Some(vec![bi, bj, p]);
            }
        }
    }

    None
}

fn encloses_not(a: Disc, b: Disc) -> bool {
    let dr = a.r - b.r;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: Disc, b: Disc) -> bool {
    let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: Disc, basis: &[Disc]) -> bool {
    basis.iter().all(|member| encloses_weak(a, *member))
}

fn enclose_basis(basis: &[Disc]) -> Option<Disc> {
    match basis {
        [a] => Some(*a),
        [a, b] => Some(enclose_basis2(*a, *b)),
        [a, b, c] => Some(enclose_basis3(*a, *b, *c)),
        _ => None,
    }
}

fn enclose_basis2(a: Disc, b: Disc) -> Disc {
    let x21 = b.x - a.x;
    let y21 = b.y - a.y;
    let r21 = b.r - a.r;
    let l = (x21 * x21 + y21 * y21).sqrt();
    if l <= f64::EPSILON {
        return if a.r >= b.r { a } else { b };
    }

    Disc {
        x: (a.x + b.x + x21 / l * r21) / 2.0,
        y: (a.y + b.y + y21 / l * r21) / 2.0,
        r: (l + a.r + b.r) / 2.0,
    }
}

fn enclose_basis3(a: Disc, b: Disc, c: Disc) -> Disc {
    let (x1, y1, r1) = (a.x, a.y, a.r);
    let (x2, y2, r2) = (b.x, b.y, b.r);
    let (x3, y3, r3) = (c.x, c.y, c.r);
    let a2 = x1 - x2;
    let a3 = x1 - x3;
    let b2 = y1 - y2;
    let b3 = y1 - y3;
    let c2 = r2 - r1;
    let c3 = r3 - r1;
    let d1 = x1 * x1 + y1 * y1 - r1 * r1;
    let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
    let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
    let ab = a3 * b2 - a2 * b3;
    let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
    let xb = (b3 * c2 - b2 * c3) / ab;
    let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
    let yb = (a2 * c3 - a3 * c2) / ab;
    let qa = xb * xb + yb * yb - 1.0;
    let qb = 2.0 * (r1 + xa * xb + ya * yb);
    let qc = xa * xa + ya * ya - r1 * r1;
    let r = -(if qa.abs() > 1e-6 {
        (qb + (qb * qb - 4.0 * qa * qc).sqrt()) / (2.0 * qa)
    } else {
        qc / qb
    });

    Disc {
        x: x1 + xa + xb * r,
        y: y1 + ya + yb * r,
        r,
    }
}
