//! Texture entry points

use log::{debug, trace};

use crate::colour::Colour;
use crate::error::{RenderError, RenderResult, Resource};
use crate::resource::{Handle, PixelFormat, PixelType, Texture, TextureParameter, TextureTarget};

use super::{generate, RenderingContext};

impl RenderingContext {
    pub fn gen_textures(&mut self, count: usize) -> RenderResult<Vec<Handle<Texture>>> {
        generate(&mut self.textures, count)
    }

    /// Select the unit `bind_texture` and the texture image calls operate on
    pub fn active_texture(&mut self, unit: usize) -> RenderResult<()> {
        self.texture_units.set_active(unit)
    }

    pub fn bind_texture(&mut self, target: TextureTarget, texture: Option<Handle<Texture>>) -> RenderResult<()> {
        if let Some(texture) = texture {
            self.textures.validate(texture)?;
        }

        trace!("Binding {:?} to {:?} of unit {}", texture, target, self.texture_units.active());

        self.texture_units.bind(texture);

        Ok(())
    }

    fn bound_texture_mut(&mut self, target: TextureTarget) -> RenderResult<&mut Texture> {
        let handle = self.texture_units.get(self.texture_units.active())
                         .ok_or(RenderError::UnboundResource(Resource::Texture))?;

        trace!("Modifying {:?} through {:?}", handle, target);

        self.textures.get_mut(handle)
    }

    /// Specify the image of the texture bound to the active unit
    pub fn tex_image_2d(&mut self,
                        target: TextureTarget,
                        width: u32,
                        height: u32,
                        format: PixelFormat,
                        ty: PixelType,
                        data: &[u8]) -> RenderResult<()> {
        self.bound_texture_mut(target)?.set_image(width, height, format, ty, data)
    }

    /// Like `tex_image_2d`, with texels that are already colours
    pub fn tex_image_colours(&mut self, target: TextureTarget, width: u32, height: u32, texels: Vec<Colour>) -> RenderResult<()> {
        self.bound_texture_mut(target)?.set_texels(width, height, texels)
    }

    pub fn tex_parameter(&mut self, target: TextureTarget, param: TextureParameter) -> RenderResult<()> {
        self.bound_texture_mut(target)?.set_parameter(param);

        Ok(())
    }

    /// Delete textures, clearing them from every unit they are bound to
    pub fn delete_textures(&mut self, textures: &[Handle<Texture>]) {
        for &texture in textures {
            if self.textures.destroy(texture).is_some() {
                let cleared = self.texture_units.unbind_all(texture);

                debug!("Deleted {:?}, cleared from {} unit(s)", texture, cleared);
            }
        }
    }

    #[inline]
    pub fn is_texture(&self, texture: Handle<Texture>) -> bool {
        self.textures.contains(texture)
    }
}

#[cfg(test)]
mod test {
    use crate::config::ContextConfig;
    use crate::resource::Filter;
    use crate::shader::ShaderLibrary;

    use super::*;

    #[test]
    fn test_image_goes_to_active_unit() {
        let mut context = RenderingContext::new(ContextConfig::default().with_texture_units(2), ShaderLibrary::new());
        let texture = context.gen_textures(1).unwrap()[0];

        assert_eq!(context.tex_parameter(TextureTarget::Texture2D, TextureParameter::MinFilter(Filter::Linear)),
                   Err(RenderError::UnboundResource(Resource::Texture)));

        context.active_texture(1).unwrap();
        context.bind_texture(TextureTarget::Texture2D, Some(texture)).unwrap();
        context.tex_image_2d(TextureTarget::Texture2D, 1, 1, PixelFormat::Rgba, PixelType::UnsignedByte, &[255, 0, 0, 255]).unwrap();

        assert!(context.active_texture(2).is_err());
        assert_eq!(context.textures.get(texture).unwrap().dimensions().map(|d| d.area()), Some(1));
        assert_eq!(context.texture_units.get(1), Some(texture));
        assert_eq!(context.texture_units.get(0), None);
    }

    #[test]
    fn test_delete_clears_units() {
        let mut context = RenderingContext::new(ContextConfig::default(), ShaderLibrary::new());
        let texture = context.gen_textures(1).unwrap()[0];

        context.bind_texture(TextureTarget::Texture2D, Some(texture)).unwrap();
        context.active_texture(3).unwrap();
        context.bind_texture(TextureTarget::Texture2D, Some(texture)).unwrap();

        context.delete_textures(&[texture]);

        assert!(!context.is_texture(texture));
        assert_eq!(context.texture_units.get(0), None);
        assert_eq!(context.texture_units.get(3), None);
    }
}
