//! Instruction semantics.
//!
//! Every operation receives the state with the pc already moved past the
//! instruction being executed and returns the next state. Nothing is
//! committed when an operation fails.
use rand::{Rng, RngCore};

use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH, GLYPH_SIZE};
use crate::error::Result;
use crate::state::{KeyWait, State};

/// clear
pub fn clr(state: &State) -> Result<State> {
    Ok(State {
        frame_buffer: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
        draw_flag: true,
        ..*state
    })
}

/// PC = STACK.pop()
pub fn rts(state: &State) -> Result<State> {
    let mut next = *state;
    next.pc = next.pop()?;
    Ok(next)
}

/// PC = addr
pub fn jump(addr: u16, state: &State) -> Result<State> {
    Ok(State { pc: addr, ..*state })
}

/// STACK.push(PC); PC = addr
pub fn call(addr: u16, state: &State) -> Result<State> {
    let mut next = *state;
    next.push(state.pc)?;
    next.pc = addr;
    Ok(next)
}

/// if cond then pc += 2
fn skip_if(cond: bool, state: &State) -> Result<State> {
    let pc = if cond {
        state.pc.wrapping_add(0x2)
    } else {
        state.pc
    };
    Ok(State { pc, ..*state })
}

/// if Vx == kk then pc += 2
pub fn ske(x: u8, kk: u8, state: &State) -> Result<State> {
    skip_if(state.v[x as usize] == kk, state)
}

/// if Vx != kk then pc += 2
pub fn skne(x: u8, kk: u8, state: &State) -> Result<State> {
    skip_if(state.v[x as usize] != kk, state)
}

/// if Vx == Vy then pc += 2
pub fn skre(x: u8, y: u8, state: &State) -> Result<State> {
    skip_if(state.v[x as usize] == state.v[y as usize], state)
}

/// if Vx != Vy then pc += 2
pub fn skrne(x: u8, y: u8, state: &State) -> Result<State> {
    skip_if(state.v[x as usize] != state.v[y as usize], state)
}

/// Vx = kk
pub fn load(x: u8, kk: u8, state: &State) -> Result<State> {
    let mut v = state.v;
    v[x as usize] = kk;
    Ok(State { v, ..*state })
}

/// Vx += kk
/// Overflow wraps and leaves VF alone
pub fn add(x: u8, kk: u8, state: &State) -> Result<State> {
    let mut v = state.v;
    v[x as usize] = v[x as usize].wrapping_add(kk);
    Ok(State { v, ..*state })
}

/// Writes VF and then Vx, so when x is F the result wins over the flag
fn with_flag(x: u8, res: u8, flag: bool, state: &State) -> Result<State> {
    let mut v = state.v;
    v[0xF] = flag as u8;
    v[x as usize] = res;
    Ok(State { v, ..*state })
}

/// Vx = Vy
pub fn mv(x: u8, y: u8, state: &State) -> Result<State> {
    load(x, state.v[y as usize], state)
}

/// Vx |= Vy
pub fn or(x: u8, y: u8, state: &State) -> Result<State> {
    load(x, state.v[x as usize] | state.v[y as usize], state)
}

/// Vx &= Vy
pub fn and(x: u8, y: u8, state: &State) -> Result<State> {
    load(x, state.v[x as usize] & state.v[y as usize], state)
}

/// Vx ^= Vy
pub fn xor(x: u8, y: u8, state: &State) -> Result<State> {
    load(x, state.v[x as usize] ^ state.v[y as usize], state)
}

/// Vx += Vy; VF = carry
pub fn addr(x: u8, y: u8, state: &State) -> Result<State> {
    let (res, carry) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    with_flag(x, res, carry, state)
}

/// Vx -= Vy; VF = Vx > Vy
pub fn sub(x: u8, y: u8, state: &State) -> Result<State> {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    with_flag(x, vx.wrapping_sub(vy), vx > vy, state)
}

/// Vx >>= 1; VF = the bit shifted out
pub fn shr(x: u8, state: &State) -> Result<State> {
    let vx = state.v[x as usize];
    with_flag(x, vx >> 1, vx & 0x1 == 0x1, state)
}

/// Vx = Vy - Vx; VF = Vy > Vx
pub fn subn(x: u8, y: u8, state: &State) -> Result<State> {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    with_flag(x, vy.wrapping_sub(vx), vy > vx, state)
}

/// Vx <<= 1; VF = the bit shifted out
pub fn shl(x: u8, state: &State) -> Result<State> {
    let vx = state.v[x as usize];
    with_flag(x, vx << 1, vx & 0x80 == 0x80, state)
}

/// I = addr
pub fn loadi(addr: u16, state: &State) -> Result<State> {
    Ok(State { i: addr, ..*state })
}

/// PC = V0 + addr
pub fn jumpi(addr: u16, state: &State) -> Result<State> {
    jump(u16::from(state.v[0x0]) + addr, state)
}

/// Vx = rand_byte & kk
pub fn rand(x: u8, kk: u8, state: &State, rng: &mut dyn RngCore) -> Result<State> {
    let rand_byte: u8 = rng.gen();
    load(x, rand_byte & kk, state)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the sprite stored at I..I+n onto the FrameBuffer at (Vx, Vy), wrapping
/// every pixel around the screen edges. VF = 1 if any lit pixel was erased.
pub fn draw(x: u8, y: u8, n: u8, state: &State) -> Result<State> {
    let sprite = state.read(state.i, n as usize)?;
    let origin_x = state.v[x as usize] as usize % DISPLAY_WIDTH;
    let origin_y = state.v[y as usize] as usize % DISPLAY_HEIGHT;

    let mut frame_buffer = state.frame_buffer;
    let mut collision = 0x0;

    for (row, &byte) in sprite.iter().enumerate() {
        let y = (origin_y + row) % DISPLAY_HEIGHT;
        for bit in 0..8 {
            let x = (origin_x + bit) % DISPLAY_WIDTH;
            let pixel = (byte >> (7 - bit)) & 0x1;
            collision |= pixel & frame_buffer[y][x];
            frame_buffer[y][x] ^= pixel;
        }
    }

    let mut v = state.v;
    v[0xF] = collision;
    Ok(State {
        v,
        frame_buffer,
        draw_flag: true,
        ..*state
    })
}

/// if Vx.pressed then pc += 2
pub fn skpr(x: u8, state: &State) -> Result<State> {
    skip_if(state.is_key_down(state.v[x as usize]), state)
}

/// if !Vx.pressed then pc += 2
pub fn skup(x: u8, state: &State) -> Result<State> {
    skip_if(!state.is_key_down(state.v[x as usize]), state)
}

/// Vx = DT
pub fn moved(x: u8, state: &State) -> Result<State> {
    load(x, state.delay_timer, state)
}

/// await keypress for Vx
/// Rewinds the pc onto this instruction; `await_key` moves it on again.
pub fn keyd(x: u8, state: &State) -> Result<State> {
    Ok(State {
        pc: state.pc.wrapping_sub(0x2),
        key_wait: Some(KeyWait {
            register: x,
            held: state.keys,
        }),
        ..*state
    })
}

/// Services a pending FX0A.
///
/// Any key that went down since the last poll is written to the waiting
/// register, the lowest one if several did, and the pc moves past the FX0A.
/// Otherwise only the remembered latch is refreshed, so that releasing a held
/// key and pressing it again counts.
pub fn await_key(wait: KeyWait, state: &State) -> State {
    let pressed = state.keys & !wait.held;
    if pressed == 0 {
        return State {
            key_wait: Some(KeyWait {
                held: state.keys,
                ..wait
            }),
            ..*state
        };
    }

    let mut v = state.v;
    v[wait.register as usize] = pressed.trailing_zeros() as u8;
    State {
        v,
        pc: state.pc.wrapping_add(0x2),
        key_wait: None,
        ..*state
    }
}

/// DT = Vx
pub fn loads(x: u8, state: &State) -> Result<State> {
    Ok(State {
        delay_timer: state.v[x as usize],
        ..*state
    })
}

/// ST = Vx
pub fn ld(x: u8, state: &State) -> Result<State> {
    Ok(State {
        sound_timer: state.v[x as usize],
        ..*state
    })
}

/// I += Vx
pub fn addi(x: u8, state: &State) -> Result<State> {
    loadi(state.i.wrapping_add(u16::from(state.v[x as usize])), state)
}

/// I = Vx * 5
/// Points I at the glyph for the digit in Vx; see constants::SPRITE_SHEET
pub fn ldspr(x: u8, state: &State) -> Result<State> {
    loadi(u16::from(state.v[x as usize]) * GLYPH_SIZE, state)
}

/// mem[I..I+3] = bcd(Vx)
pub fn bcd(x: u8, state: &State) -> Result<State> {
    let vx = state.v[x as usize];
    let mut next = *state;
    next.write(state.i, &[vx / 100, vx / 10 % 10, vx % 10])?;
    Ok(next)
}

/// mem[I..=I+x] = V0..=Vx
pub fn stor(x: u8, state: &State) -> Result<State> {
    let mut next = *state;
    next.write(state.i, &state.v[..=x as usize])?;
    Ok(next)
}

/// V0..=Vx = mem[I..=I+x]
pub fn read(x: u8, state: &State) -> Result<State> {
    let mut v = state.v;
    v[..=x as usize].copy_from_slice(state.read(state.i, x as usize + 1)?);
    Ok(State { v, ..*state })
}
